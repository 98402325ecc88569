//! # sheetmerge
//!
//! Combine sheets from many independently authored Excel workbooks into a
//! single workbook, keeping what makes each sheet look and behave the way it
//! did: values, formulas (as text, never recalculated), fonts, fills,
//! borders, number formats, alignment, protection, merged regions, column
//! widths and row heights.
//!
//! ## Pipeline
//!
//! - [`normalize`] turns a file name like `20260211_4467 South Acton ESG.xlsx`
//!   into the label `South Acton ESG`.
//! - [`SheetNameResolver`] names each output sheet `"{label} - {sheet}"`,
//!   made legal and unique.
//! - [`SheetCopier`] copies a sheet's content, giving every styled cell its
//!   own style value.
//! - [`CombineOrchestrator`] (or the [`combine`] shortcut) runs the files in
//!   order, collecting warnings for files it has to skip.
//! - [`persist`] writes the result, refusing an empty workbook.
//!
//! ## Example
//!
//! ```rust
//! use sheetmerge::prelude::*;
//!
//! # fn build(sheets: &[&str]) -> Vec<u8> {
//! #     let mut wb = Workbook::empty();
//! #     for name in sheets {
//! #         wb.add_worksheet_with_name(name).unwrap();
//! #     }
//! #     XlsxWriter::to_bytes(&wb).unwrap()
//! # }
//! let files = vec![
//!     SourceFile::new("20260211_4467 South Acton ESG.xlsx", build(&["Jan", "Feb"])),
//!     SourceFile::new("Report.xlsx", build(&["Jan"])),
//! ];
//!
//! let outcome = combine(&files, "Jan").unwrap();
//! for warning in &outcome.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//!
//! let names: Vec<&str> = outcome.workbook.worksheets().map(|ws| ws.name()).collect();
//! assert_eq!(names, ["South Acton ESG - Jan", "Report - Jan"]);
//!
//! let bytes = persist(&outcome.workbook).unwrap();
//! assert!(!bytes.is_empty());
//! ```

pub mod combine;
pub mod copy;
pub mod error;
pub mod naming;
pub mod normalize;
pub mod persist;
pub mod prelude;

pub use combine::{
    combine, CombineOptions, CombineOrchestrator, CombineOutcome, FileReport, FileState,
    ProgressObserver, SourceFile,
};
pub use copy::{CopyStats, SheetCopier};
pub use error::{CombineError, PersistError};
pub use naming::{NamingRegistry, SheetNameResolver};
pub use normalize::normalize;
pub use persist::{persist, persist_file, persist_to};

// Re-export core types
pub use sheetmerge_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, CellAddress, CellData, CellError,
    CellRange, CellValue, Color, Error, FillStyle, FontStyle, HorizontalAlignment, NumberFormat,
    Protection, Result, Style, VerticalAlignment, Workbook, Worksheet, INVALID_SHEET_NAME_CHARS,
    MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN, RESERVED_SHEET_NAME,
};

// Re-export I/O types
pub use sheetmerge_xlsx::{XlsxError, XlsxReader, XlsxWriter};
