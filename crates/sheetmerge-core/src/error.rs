//! Error types for sheetmerge-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the workbook model
#[derive(Debug, Error)]
pub enum Error {
    /// Text that is not an A1 cell reference
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Text that is not an A1:B2 range
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row past the last one a sheet can hold
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column past the last one a sheet can hold
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// No sheet at this position
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Sheet name breaks the container's naming rules
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    /// Another sheet already has this name, compared ignoring case
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Merged region overlaps an existing one
    #[error("Merged region {0} overlaps an existing merged region")]
    MergedCellConflict(String),
}
