//! Error types for the combine pipeline

use sheetmerge_xlsx::XlsxError;
use thiserror::Error;

/// Failures that stop a combine run before it produces anything
///
/// Problems with a single input file are not errors: they become warnings
/// on the [`CombineOutcome`](crate::CombineOutcome).
#[derive(Debug, Error)]
pub enum CombineError {
    /// No source files were supplied
    #[error("please provide at least one file")]
    NoInputs,

    /// The output workbook rejected a sheet it was handed
    #[error(transparent)]
    Core(#[from] sheetmerge_core::Error),
}

/// Failures while serializing the combined workbook
#[derive(Debug, Error)]
pub enum PersistError {
    /// Nothing was ever appended to the output workbook
    #[error("no matching sheets found across all inputs")]
    EmptyResult,

    /// The container encoder failed
    #[error("failed to write workbook: {0}")]
    Write(#[from] XlsxError),
}
