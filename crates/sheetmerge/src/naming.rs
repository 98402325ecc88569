//! Output sheet naming
//!
//! Every sheet placed in the combined workbook is named
//! `"{label} - {source sheet}"`, squeezed into the container's naming rules:
//! at most [`MAX_SHEET_NAME_LEN`] characters, none of
//! [`INVALID_SHEET_NAME_CHARS`], no apostrophe at either end, and unique
//! ignoring case. A composed name always holds the separator or runs to the
//! full length, so it can never be the reserved `History`.

use std::collections::HashSet;

use sheetmerge_core::{INVALID_SHEET_NAME_CHARS, MAX_SHEET_NAME_LEN};

const SEPARATOR: &str = " - ";

/// Sheet names already handed out during one combine run
///
/// Names are compared case-insensitively, the same way the container does.
#[derive(Debug, Clone, Default)]
pub struct NamingRegistry {
    taken: HashSet<String>,
}

impl NamingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `name` (in any case) is already taken
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(&name.to_lowercase())
    }

    /// Record `name` as taken; returns `false` if it already was
    pub fn insert(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_lowercase())
    }

    /// Number of names taken
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// Check if no name has been taken yet
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// Produces legal, unique output sheet names
pub struct SheetNameResolver;

impl SheetNameResolver {
    /// Name the copy of `sheet` taken from the file labelled `label`
    ///
    /// The returned name is recorded in `registry`. It is never empty, never
    /// longer than [`MAX_SHEET_NAME_LEN`] characters, contains no illegal
    /// character and differs (ignoring case) from every name the registry
    /// held before. This never fails:
    /// - illegal characters, and apostrophes at either end, become spaces;
    /// - an over-long name loses characters from the end of the label first,
    ///   and only from the whole name when the sheet part alone is too long;
    /// - a taken name gets a `" (2)"`, `" (3)"`, ... suffix, shortened again
    ///   to make room for it.
    pub fn resolve(label: &str, sheet: &str, registry: &mut NamingRegistry) -> String {
        let label = sanitize(label);
        let sheet = sanitize(sheet);

        let mut name = compose(&label, &sheet, "");
        let mut n: u64 = 1;
        while registry.contains(&name) {
            n += 1;
            name = compose(&label, &sheet, &format!(" ({})", n));
        }

        registry.insert(&name);
        name
    }
}

/// Replace characters a sheet name cannot hold with spaces
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if INVALID_SHEET_NAME_CHARS.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Build `"{label} - {sheet}{suffix}"` within the length limit
fn compose(label: &str, sheet: &str, suffix: &str) -> String {
    let budget = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
    let label_len = label.chars().count();
    let fixed = SEPARATOR.len() + sheet.chars().count();

    let mut name = if label_len + fixed <= budget {
        format!("{}{}{}", label, SEPARATOR, sheet)
    } else if fixed < budget {
        let kept: String = label.chars().take(budget - fixed).collect();
        format!("{}{}{}", kept.trim_end(), SEPARATOR, sheet)
    } else {
        format!("{}{}{}", label, SEPARATOR, sheet)
            .chars()
            .take(budget)
            .collect()
    };

    // Excel rejects a name that begins or ends with an apostrophe
    if name.starts_with('\'') {
        name.replace_range(..1, " ");
    }
    if suffix.is_empty() && name.ends_with('\'') {
        name.pop();
        name.push(' ');
    }

    name.push_str(suffix);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolve_all(pairs: &[(&str, &str)]) -> Vec<String> {
        let mut registry = NamingRegistry::new();
        pairs
            .iter()
            .map(|(label, sheet)| SheetNameResolver::resolve(label, sheet, &mut registry))
            .collect()
    }

    #[test]
    fn test_plain_name() {
        let mut registry = NamingRegistry::new();
        let name = SheetNameResolver::resolve("South Acton ESG", "Jan", &mut registry);
        assert_eq!(name, "South Acton ESG - Jan");
        assert!(registry.contains("south acton esg - jan"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_long_label_is_shortened_first() {
        let mut registry = NamingRegistry::new();
        let name = SheetNameResolver::resolve(
            "Northern Regional Operations Center",
            "Summary",
            &mut registry,
        );
        assert_eq!(name, "Northern Regional Ope - Summary");
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(name.ends_with(" - Summary"));
    }

    #[test]
    fn test_label_trailing_space_trimmed_after_cut() {
        let mut registry = NamingRegistry::new();
        // Cut lands right after "Regional"
        let name =
            SheetNameResolver::resolve("Big Regional Office", "Operations Data", &mut registry);
        assert_eq!(name, "Big Regional - Operations Data");
    }

    #[test]
    fn test_long_sheet_name_truncates_whole_name() {
        let mut registry = NamingRegistry::new();
        let sheet = "A".repeat(31);
        let name = SheetNameResolver::resolve("Site", &sheet, &mut registry);
        assert_eq!(name, format!("Site - {}", "A".repeat(24)));
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_collisions_get_numbered() {
        let names = resolve_all(&[
            ("Acton", "Jan"),
            ("Acton", "Jan"),
            ("ACTON", "jan"),
            ("Acton", "Feb"),
        ]);
        assert_eq!(
            names,
            vec!["Acton - Jan", "Acton - Jan (2)", "ACTON - jan (3)", "Acton - Feb"]
        );
    }

    #[test]
    fn test_collision_suffix_fits_limit() {
        let label = "Northern Regional Operations Center";
        let names = resolve_all(&[(label, "Summary"), (label, "Summary")]);
        assert_eq!(names[0], "Northern Regional Ope - Summary");
        assert_eq!(names[1], "Northern Regional - Summary (2)");
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_NAME_LEN));
    }

    #[test]
    fn test_truncated_names_that_collide_stay_unique() {
        let sheet = "B".repeat(31);
        let names = resolve_all(&[("x", sheet.as_str()), ("y", sheet.as_str()), ("x", sheet.as_str())]);
        assert_eq!(names[0], format!("x - {}", "B".repeat(27)));
        assert_eq!(names[1], format!("y - {}", "B".repeat(27)));
        assert_eq!(names[2], format!("x - {} (2)", "B".repeat(23)));
    }

    #[test]
    fn test_illegal_characters_become_spaces() {
        let names = resolve_all(&[("Q1/Q2 [draft]", "P&L: *all*?"), ("a\\b", "c\td")]);
        assert_eq!(names[0], "Q1 Q2  draft  - P&L   all  ");
        assert_eq!(names[1], "a b - c d");
        for name in &names {
            assert!(!name.contains(INVALID_SHEET_NAME_CHARS));
        }
    }

    #[test]
    fn test_edge_apostrophes_become_spaces() {
        let names = resolve_all(&[("'Quoted", "Sheet'"), ("Don't", "it's")]);
        assert_eq!(names[0], " Quoted - Sheet ");
        assert_eq!(names[1], "Don't - it's");

        // Cut mid-name right after an apostrophe
        let sheet = format!("{}'xyz", "b".repeat(26));
        let names = resolve_all(&[("a", sheet.as_str())]);
        assert_eq!(names[0], format!("a - {} ", "b".repeat(26)));
        assert!(sheetmerge_core::validate_sheet_name(&names[0]).is_ok());
    }

    #[test]
    fn test_empty_label() {
        let names = resolve_all(&[("", "Data")]);
        assert_eq!(names[0], " - Data");
    }

    #[test]
    fn test_multibyte_counts_chars() {
        let label = "é".repeat(40);
        let names = resolve_all(&[(label.as_str(), "Übersicht")]);
        assert_eq!(names[0].chars().count(), MAX_SHEET_NAME_LEN);
        assert!(names[0].ends_with(" - Übersicht"));
    }

    #[test]
    fn test_registry_insert_reports_duplicates() {
        let mut registry = NamingRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert("Data"));
        assert!(!registry.insert("DATA"));
        assert_eq!(registry.len(), 1);
    }
}
