//! Cell value types

use std::fmt;
use std::sync::Arc;

use super::CellRange;

/// What a cell holds
///
/// Formulas are carried as text and never evaluated. Whatever result the
/// source file had cached for a formula rides along unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// Nothing stored
    #[default]
    Empty,

    /// TRUE/FALSE
    Boolean(bool),

    /// Any number, dates included
    Number(f64),

    /// Text
    String(SharedString),

    /// An error literal such as `#N/A`
    Error(CellError),

    /// Formula, stored verbatim
    Formula {
        /// Formula text including the leading `=` (e.g., "=SUM(A1:A10)")
        text: String,
        /// Result cached by whatever application last saved the file
        cached_value: Option<Box<CellValue>>,
        /// Cells an array (CSE) formula covers; `None` for an ordinary formula
        array_range: Option<CellRange>,
    },
}

impl CellValue {
    /// Create a text value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::new(s.into()))
    }

    /// Create a formula with no cached result
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
            array_range: None,
        }
    }

    /// Create a formula value carrying a cached result
    pub fn formula_with_cached<S: Into<String>>(text: S, cached: CellValue) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: Some(Box::new(cached)),
            array_range: None,
        }
    }

    /// Create an array formula anchored on the top-left cell of `range`
    pub fn array_formula<S: Into<String>>(
        text: S,
        range: CellRange,
        cached: Option<CellValue>,
    ) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: cached.map(Box::new),
            array_range: Some(range),
        }
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The number held, looking through a formula to its cached result
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v.as_number(),
            _ => None,
        }
    }

    /// The text held, looking through a formula to its cached result
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v.as_string(),
            _ => None,
        }
    }

    /// Formula text, if this is a formula
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Range covered by an array formula
    pub fn array_range(&self) -> Option<CellRange> {
        match self {
            CellValue::Formula { array_range, .. } => *array_range,
            _ => None,
        }
    }

    /// Cached result of a formula
    pub fn cached_value(&self) -> Option<&CellValue> {
        match self {
            CellValue::Formula { cached_value, .. } => cached_value.as_deref(),
            _ => None,
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Error literals a cell can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// `#NULL!`
    Null,
    /// `#DIV/0!`
    Div0,
    /// `#VALUE!`
    Value,
    /// `#REF!`
    Ref,
    /// `#NAME?`
    Name,
    /// `#NUM!`
    Num,
    /// `#N/A`
    Na,
    /// `#GETTING_DATA`
    GettingData,
    /// `#SPILL!`
    Spill,
    /// `#CALC!`
    Calc,
}

impl CellError {
    /// Every error literal
    pub const ALL: [CellError; 10] = [
        CellError::Null,
        CellError::Div0,
        CellError::Value,
        CellError::Ref,
        CellError::Name,
        CellError::Num,
        CellError::Na,
        CellError::GettingData,
        CellError::Spill,
        CellError::Calc,
    ];

    /// The literal as written in a cell
    pub fn code(self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
            CellError::GettingData => "#GETTING_DATA",
            CellError::Spill => "#SPILL!",
            CellError::Calc => "#CALC!",
        }
    }

    /// Look up a literal, ignoring case
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Immutable, cheaply cloned text
///
/// Cloning a cell clones the handle, not the text. The text can never be
/// mutated in place, so sharing it between cells is safe.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a new shared string
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Get the string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
