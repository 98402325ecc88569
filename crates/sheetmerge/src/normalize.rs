//! Source file labels
//!
//! Exported workbooks tend to be named with a date stamp and a record id in
//! front of the part a person cares about (`20260211_4467 South Acton ESG.xlsx`).
//! [`normalize`] reduces such a name to its readable label.

use lazy_regex::{lazy_regex, Lazy, Regex};

/// A run of digits, optional `_`/`-`/space separators, an optional second
/// digit run, then any spaces
static NUMERIC_PREFIX: Lazy<Regex> = lazy_regex!(r"^\d+[_\-\s]*\d*\s*");

const EXTENSIONS: &[&str] = &[".xlsx", ".xlsm"];

/// Derive a label from a source file name
///
/// Strips a trailing `.xlsx`/`.xlsm` extension (any case) and a leading
/// numeric prefix, then trims whitespace. A name that is nothing but a
/// prefix (`20260211.xlsx`) keeps its trimmed base name, so the label is
/// never emptied by the prefix rule.
///
/// ```rust
/// use sheetmerge::normalize;
///
/// assert_eq!(normalize("20260211_4467 South Acton ESG.xlsx"), "South Acton ESG");
/// assert_eq!(normalize("Report.xlsx"), "Report");
/// ```
pub fn normalize(raw: &str) -> String {
    let base = strip_extension(raw);
    let stripped = NUMERIC_PREFIX.replace(base, "");
    let label = stripped.trim();
    if label.is_empty() {
        base.trim().to_string()
    } else {
        label.to_string()
    }
}

fn strip_extension(name: &str) -> &str {
    for ext in EXTENSIONS {
        let split = name.len().saturating_sub(ext.len());
        if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(ext) {
            return &name[..split];
        }
    }
    name
}
