//! Prelude module - common imports for sheetmerge users
//!
//! ```rust
//! use sheetmerge::prelude::*;
//! ```

pub use crate::{
    // Combine pipeline
    combine,
    normalize,
    persist,
    persist_file,
    CellRange,
    // Cell types
    CellValue,
    Color,
    CombineError,
    CombineOptions,
    CombineOrchestrator,
    CombineOutcome,
    FileState,
    PersistError,
    ProgressObserver,
    SheetCopier,
    SheetNameResolver,
    SourceFile,
    // Style types
    Style,
    // Main types
    Workbook,
    Worksheet,
    // I/O types
    XlsxReader,
    XlsxWriter,
};
