//! # sheetmerge-xlsx
//!
//! XLSX (Office Open XML) reader and writer for sheetmerge.
//!
//! The reader loads every worksheet with cell values, formulas (never
//! evaluated), per-cell styles, merged regions and explicit row/column
//! dimensions. The writer encodes the same information back, deduplicating
//! cell styles into the shared `cellXfs` table only at that point.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
