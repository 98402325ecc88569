//! # sheetmerge-core
//!
//! Core data structures for the sheetmerge workbook combiner.
//!
//! This crate provides the in-memory workbook model that the rest of
//! sheetmerge reads into, copies between, and writes out:
//! - [`CellValue`] - Represents cell values (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Style`] - Cell formatting (fonts, fills, borders, alignment, number formats)
//! - [`Workbook`], [`Worksheet`] - The main document structures
//!
//! Every styled cell owns its [`Style`] outright. Deduplication into shared
//! records is left to the encoder, via [`StylePool`].
//!
//! ## Example
//!
//! ```rust
//! use sheetmerge_core::{CellValue, Style, Workbook};
//!
//! let mut workbook = Workbook::empty();
//! let index = workbook.add_worksheet_with_name("Summary").unwrap();
//! let sheet = workbook.worksheet_mut(index).unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_style("A1", Style::new().bold(true)).unwrap();
//!
//! // Or using row/column indices (0-based)
//! sheet.set_cell_value_at(1, 1, CellValue::Number(3.14)).unwrap();
//! sheet.set_column_width(1, 20.0);
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue};
pub use error::{Error, Result};
pub use workbook::{
    validate_sheet_name, Workbook, INVALID_SHEET_NAME_CHARS, RESERVED_SHEET_NAME,
};
pub use worksheet::Worksheet;

// Re-export all style types for convenience
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Protection, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;
