//! Shared-formula expansion
//!
//! A shared formula is written once, on the first cell of its group. The
//! other cells only name the group, and their formula is the anchor's text
//! with every relative reference moved by the cell's offset from the anchor.

use sheetmerge_core::{CellAddress, MAX_COLS, MAX_ROWS};

/// Move the relative references in `formula` by `rows` and `cols`
///
/// `$`-anchored parts stay put. String literals, quoted sheet names and
/// structured references are copied untouched. A reference pushed off the
/// sheet becomes `#REF!`.
pub(crate) fn shift_formula(formula: &str, rows: i64, cols: i64) -> String {
    if rows == 0 && cols == 0 {
        return formula.to_string();
    }

    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            let end = quoted_end(&chars, i);
            out.extend(&chars[i..end]);
            i = end;
        } else if c == '[' {
            let end = bracket_end(&chars, i);
            out.extend(&chars[i..end]);
            i = end;
        } else if is_word_char(c) {
            let end = word_end(&chars, i);
            let word: String = chars[i..end].iter().collect();

            match chars.get(end) {
                // Sheet name, function name or table name
                Some('!') | Some('(') | Some('[') => out.push_str(&word),
                Some(':') => {
                    let other_end = word_end(&chars, end + 1);
                    let other: String = chars[end + 1..other_end].iter().collect();
                    match shift_line_range(&word, &other, rows, cols) {
                        Some(shifted) => {
                            out.push_str(&shifted);
                            i = other_end;
                            continue;
                        }
                        None => out.push_str(&shift_cell_ref(&word, rows, cols)),
                    }
                }
                _ => out.push_str(&shift_cell_ref(&word, rows, cols)),
            }
            i = end;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

fn word_end(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && is_word_char(chars[i]) {
        i += 1;
    }
    i
}

/// End of a `"..."` or `'...'` run; a doubled quote stays inside
fn quoted_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

fn bracket_end(chars: &[char], start: usize) -> usize {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(start) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    chars.len()
}

fn strip_dollar(s: &str) -> (bool, &str) {
    match s.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

/// `$`-marker and 0-based column of a bare column part such as `$C`
fn column_part(s: &str) -> Option<(bool, i64)> {
    let (absolute, letters) = strip_dollar(s);
    if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_alphabetic())
    {
        return None;
    }
    let col = CellAddress::letters_to_column(letters).ok()?;
    Some((absolute, i64::from(col)))
}

/// `$`-marker and 0-based row of a bare row part such as `$12`
fn row_part(s: &str) -> Option<(bool, i64)> {
    let (absolute, digits) = strip_dollar(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: i64 = digits.parse().ok()?;
    (1..=i64::from(MAX_ROWS)).contains(&row).then_some((absolute, row - 1))
}

fn shift(index: i64, delta: i64, absolute: bool, limit: i64) -> Option<i64> {
    if absolute {
        return Some(index);
    }
    let moved = index + delta;
    (0..limit).contains(&moved).then_some(moved)
}

fn column_text(absolute: bool, col: i64) -> String {
    let dollar = if absolute { "$" } else { "" };
    format!("{}{}", dollar, CellAddress::column_to_letters(col as u16))
}

fn row_text(absolute: bool, row: i64) -> String {
    let dollar = if absolute { "$" } else { "" };
    format!("{}{}", dollar, row + 1)
}

/// Shift `word` if it is an A1 reference, otherwise return it unchanged
fn shift_cell_ref(word: &str, rows: i64, cols: i64) -> String {
    let (col_abs, rest) = strip_dollar(word);
    let letters = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if letters == 0 {
        return word.to_string();
    }
    let (letters, row_str) = rest.split_at(letters);
    let (Some((_, col)), Some((row_abs, row))) = (column_part(letters), row_part(row_str)) else {
        return word.to_string();
    };

    match (
        shift(col, cols, col_abs, i64::from(MAX_COLS)),
        shift(row, rows, row_abs, i64::from(MAX_ROWS)),
    ) {
        (Some(col), Some(row)) => format!("{}{}", column_text(col_abs, col), row_text(row_abs, row)),
        _ => "#REF!".to_string(),
    }
}

/// Shift a whole-column (`A:C`) or whole-row (`2:5`) range
fn shift_line_range(a: &str, b: &str, rows: i64, cols: i64) -> Option<String> {
    let shifted = if let (Some(a), Some(b)) = (column_part(a), column_part(b)) {
        let limit = i64::from(MAX_COLS);
        match (shift(a.1, cols, a.0, limit), shift(b.1, cols, b.0, limit)) {
            (Some(x), Some(y)) => format!("{}:{}", column_text(a.0, x), column_text(b.0, y)),
            _ => "#REF!".to_string(),
        }
    } else if let (Some(a), Some(b)) = (row_part(a), row_part(b)) {
        let limit = i64::from(MAX_ROWS);
        match (shift(a.1, rows, a.0, limit), shift(b.1, rows, b.0, limit)) {
            (Some(x), Some(y)) => format!("{}:{}", row_text(a.0, x), row_text(b.0, y)),
            _ => "#REF!".to_string(),
        }
    } else {
        return None;
    };
    Some(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_relative_refs() {
        assert_eq!(shift_formula("B2*2", 1, 0), "B3*2");
        assert_eq!(shift_formula("SUM(A1:B2)+C3", 2, 1), "SUM(B3:C4)+D5");
        assert_eq!(shift_formula("B2*2", 0, 0), "B2*2");
    }

    #[test]
    fn test_anchored_parts_stay() {
        assert_eq!(shift_formula("$A$1+A$1+$A1", 3, 2), "$A$1+C$1+$A4");
    }

    #[test]
    fn test_non_refs_untouched() {
        assert_eq!(shift_formula("LOG10(A1)*1.5E3", 1, 0), "LOG10(A2)*1.5E3");
        assert_eq!(shift_formula("\"A1\"&A1", 1, 0), "\"A1\"&A2");
        assert_eq!(shift_formula("'Q1 A1'!A1+Sheet2!B1", 1, 1), "'Q1 A1'!B2+Sheet2!C2");
        assert_eq!(shift_formula("Sales[Amount]*A1", 1, 0), "Sales[Amount]*A2");
        assert_eq!(shift_formula("TRUE+Rate_2024", 1, 1), "TRUE+Rate_2024");
    }

    #[test]
    fn test_whole_row_and_column_ranges() {
        assert_eq!(shift_formula("SUM(A:A)", 5, 1), "SUM(B:B)");
        assert_eq!(shift_formula("SUM(2:3)", 1, 4), "SUM(3:4)");
        assert_eq!(shift_formula("SUM($A:B)", 0, 1), "SUM($A:C)");
    }

    #[test]
    fn test_shift_off_sheet_is_ref_error() {
        assert_eq!(shift_formula("A1", -1, 0), "#REF!");
        assert_eq!(shift_formula("XFD1", 0, 1), "#REF!");
    }
}
