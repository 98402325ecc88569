//! Number format types

/// Number format for cell display
///
/// Built-in formats keep their numeric id rather than a code string, since
/// several of them (dates, currency) render differently per locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// First id available for custom formats in a styles part
    pub const FIRST_CUSTOM_ID: u32 = 164;

    /// Resolve a `numFmtId`, given the custom formats declared by the workbook
    pub fn from_id(id: u32, custom: Option<&str>) -> Self {
        match (id, custom) {
            (_, Some(code)) => NumberFormat::Custom(code.to_string()),
            (0, None) => NumberFormat::General,
            (id, None) => NumberFormat::BuiltIn(id),
        }
    }

    /// Get the format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }
}

fn builtin_format_string(id: u32) -> &'static str {
    match id {
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => "General",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(NumberFormat::from_id(0, None), NumberFormat::General);
        assert_eq!(NumberFormat::from_id(14, None), NumberFormat::BuiltIn(14));
        assert_eq!(
            NumberFormat::from_id(164, Some("0.0%")),
            NumberFormat::Custom("0.0%".into())
        );
    }

    #[test]
    fn test_format_string() {
        assert_eq!(NumberFormat::BuiltIn(10).format_string(), "0.00%");
        assert_eq!(NumberFormat::Custom("#,##0.0".into()).format_string(), "#,##0.0");
        assert_eq!(NumberFormat::General.format_string(), "General");
    }
}
