//! Color representation

use std::hash::{Hash, Hasher};

/// Color as stored in a container style record
///
/// Theme and indexed colors are kept symbolic (not resolved to RGB) so a
/// copied cell renders with the destination workbook's theme exactly as the
/// source did.
#[derive(Debug, Clone, Copy, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with tint
    ///
    /// Theme indices: 0/1 = light/dark 1, 2/3 = light/dark 2, 4-9 = accents,
    /// 10/11 = hyperlink colors.
    Theme {
        /// Theme color index
        index: u8,
        /// Tint in -1.0..=1.0, 0.0 meaning untinted
        tint: f64,
    },

    /// Indexed color (legacy palette)
    Indexed(u8),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Create a theme color
    pub const fn theme(index: u8, tint: f64) -> Self {
        Color::Theme { index, tint }
    }

    /// Create from a hex string (e.g., "#FF0000", "FF0000" or "FFFF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Some(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// ARGB hex string for `rgb="..."` attributes, if this is an explicit color
    pub fn to_argb_hex(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("FF{:02X}{:02X}{:02X}", r, g, b)),
            Color::Argb { a, r, g, b } => Some(format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b)),
            _ => None,
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Color::Auto, Color::Auto) => true,
            (Color::Rgb { r, g, b }, Color::Rgb { r: r2, g: g2, b: b2 }) => {
                (r, g, b) == (r2, g2, b2)
            }
            (
                Color::Argb { a, r, g, b },
                Color::Argb {
                    a: a2,
                    r: r2,
                    g: g2,
                    b: b2,
                },
            ) => (a, r, g, b) == (a2, r2, g2, b2),
            (
                Color::Theme { index, tint },
                Color::Theme {
                    index: index2,
                    tint: tint2,
                },
            ) => index == index2 && tint.to_bits() == tint2.to_bits(),
            (Color::Indexed(i), Color::Indexed(i2)) => i == i2,
            _ => false,
        }
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Color::Auto => {}
            Color::Rgb { r, g, b } => (r, g, b).hash(state),
            Color::Argb { a, r, g, b } => (a, r, g, b).hash(state),
            Color::Theme { index, tint } => {
                index.hash(state);
                tint.to_bits().hash(state);
            }
            Color::Indexed(i) => i.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::GREEN));
        assert_eq!(
            Color::from_hex("80FF0000"),
            Some(Color::argb(0x80, 255, 0, 0))
        );
        assert_eq!(Color::from_hex("FFF"), None);
        assert_eq!(Color::from_hex("GGGGGG"), None);
    }

    #[test]
    fn test_to_argb_hex() {
        assert_eq!(Color::RED.to_argb_hex().as_deref(), Some("FFFF0000"));
        assert_eq!(
            Color::argb(0x80, 1, 2, 3).to_argb_hex().as_deref(),
            Some("80010203")
        );
        assert_eq!(Color::theme(4, 0.4).to_argb_hex(), None);
        assert_eq!(Color::Auto.to_argb_hex(), None);
    }

    #[test]
    fn test_theme_tint_is_exact() {
        let a = Color::theme(4, -0.249977111117893);
        let b = Color::theme(4, -0.249977111117893);
        let c = Color::theme(4, -0.25);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
