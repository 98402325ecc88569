//! Combining sheets from many workbooks into one
//!
//! # Example
//!
//! ```rust
//! use sheetmerge::prelude::*;
//!
//! let mut source = Workbook::empty();
//! let idx = source.add_worksheet_with_name("Jan").unwrap();
//! source.worksheet_mut(idx).unwrap().set_cell_value("A1", 42.0).unwrap();
//! let bytes = XlsxWriter::to_bytes(&source).unwrap();
//!
//! let files = vec![SourceFile::new("20260211_4467 South Acton.xlsx", bytes)];
//! let outcome = combine(&files, "").unwrap();
//!
//! assert!(outcome.warnings.is_empty());
//! assert_eq!(
//!     outcome.workbook.worksheet(0).unwrap().name(),
//!     "South Acton - Jan"
//! );
//! ```

use std::fs;
use std::io;
use std::path::Path;

use sheetmerge_core::{Workbook, Worksheet};
use sheetmerge_xlsx::XlsxReader;

use crate::copy::SheetCopier;
use crate::error::CombineError;
use crate::naming::{NamingRegistry, SheetNameResolver};
use crate::normalize::normalize;

/// One input workbook, held in memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original file name, used for the label and in warnings
    pub name: String,
    /// Raw container bytes
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source from a name and its bytes
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a source from disk, named after the path's file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Options for a combine run
#[derive(Debug, Clone, Default)]
pub struct CombineOptions {
    /// Sheet to take from every file; `None` (or an empty name) takes all sheets
    pub sheet: Option<String>,
}

impl CombineOptions {
    /// Take every sheet of every file
    pub fn all_sheets() -> Self {
        Self::default()
    }

    /// Take the sheet called `name` from every file; empty means all sheets
    pub fn sheet<S: Into<String>>(name: S) -> Self {
        Self {
            sheet: Some(name.into()),
        }
    }

    /// The requested sheet, with an empty name treated as "all sheets"
    pub fn target_sheet(&self) -> Option<&str> {
        self.sheet.as_deref().filter(|name| !name.is_empty())
    }
}

/// How processing of one input file ended
#[derive(Debug, Clone, PartialEq)]
pub enum FileState {
    /// Sheets were copied into the output, under these names
    Extracted {
        /// Output sheet names, in source order
        sheets: Vec<String>,
    },
    /// The requested sheet does not exist in this file
    SheetMissing {
        /// The name that was looked for
        sheet: String,
    },
    /// The container could not be read
    LoadFailed {
        /// Why reading failed
        reason: String,
    },
}

/// Result of processing one input file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Original file name
    pub name: String,
    /// Label derived from the name
    pub label: String,
    /// Final state
    pub state: FileState,
}

/// Everything a combine run produced
#[derive(Debug)]
pub struct CombineOutcome {
    /// The combined workbook; may hold no sheets
    pub workbook: Workbook,
    /// One human-readable line per skipped file or missing sheet
    pub warnings: Vec<String>,
    /// One report per input file, in input order
    pub reports: Vec<FileReport>,
}

impl CombineOutcome {
    /// Number of sheets in the combined workbook
    pub fn sheet_count(&self) -> usize {
        self.workbook.sheet_count()
    }
}

/// Receives progress while files are processed
///
/// Both methods default to doing nothing.
pub trait ProgressObserver {
    /// Called before file `index` (0-based) of `total` is opened
    fn file_started(&mut self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called after file `index` is done; `fraction` is `(index + 1) / total`
    fn file_finished(&mut self, index: usize, total: usize, fraction: f64) {
        let _ = (index, total, fraction);
    }
}

/// Runs a combine over a list of source files
///
/// Files are handled one at a time: each is decoded, drained into the output
/// and dropped before the next is opened. A file that cannot be read, or
/// that lacks the requested sheet, is reported and skipped.
///
/// Output sheets appear in input file order and, within a file, in the
/// file's own sheet order.
pub struct CombineOrchestrator<'a> {
    options: CombineOptions,
    observer: Option<&'a mut dyn ProgressObserver>,
}

impl<'a> CombineOrchestrator<'a> {
    /// Create an orchestrator with the given options
    pub fn new(options: CombineOptions) -> Self {
        Self {
            options,
            observer: None,
        }
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: &'a mut dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Combine `files` into one workbook
    ///
    /// Fails only when there is nothing to work on or the output workbook
    /// rejects a sheet. Per-file problems land in the outcome's warnings.
    pub fn combine(&mut self, files: &[SourceFile]) -> Result<CombineOutcome, CombineError> {
        if files.is_empty() {
            return Err(CombineError::NoInputs);
        }

        let total = files.len();
        let mut workbook = Workbook::empty();
        let mut registry = NamingRegistry::new();
        let mut warnings = Vec::new();
        let mut reports = Vec::with_capacity(total);

        tracing::info!(files = total, sheet = ?self.options.target_sheet(), "combining workbooks");

        for (index, file) in files.iter().enumerate() {
            if let Some(observer) = self.observer.as_deref_mut() {
                observer.file_started(index, total, &file.name);
            }
            tracing::info!(file = %file.name, index = index + 1, total, "processing");

            let label = normalize(&file.name);
            let state =
                self.process_file(file, &label, &mut workbook, &mut registry, &mut warnings)?;
            reports.push(FileReport {
                name: file.name.clone(),
                label,
                state,
            });

            if let Some(observer) = self.observer.as_deref_mut() {
                observer.file_finished(index, total, (index + 1) as f64 / total as f64);
            }
        }

        tracing::info!(
            sheets = workbook.sheet_count(),
            warnings = warnings.len(),
            "combine finished"
        );

        Ok(CombineOutcome {
            workbook,
            warnings,
            reports,
        })
    }

    fn process_file(
        &self,
        file: &SourceFile,
        label: &str,
        workbook: &mut Workbook,
        registry: &mut NamingRegistry,
        warnings: &mut Vec<String>,
    ) -> Result<FileState, CombineError> {
        let source = match XlsxReader::from_bytes(&file.bytes) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "skipping unreadable file");
                warnings.push(format!("Could not read {}: {}", file.name, e));
                return Ok(FileState::LoadFailed {
                    reason: e.to_string(),
                });
            }
        };

        let selected: Vec<&Worksheet> = match self.options.target_sheet() {
            Some(wanted) => match source.worksheet_by_name(wanted) {
                Some(sheet) => vec![sheet],
                None => {
                    tracing::warn!(file = %file.name, sheet = wanted, "sheet not found");
                    warnings.push(format!("Sheet '{}' not found in {}", wanted, file.name));
                    return Ok(FileState::SheetMissing {
                        sheet: wanted.to_string(),
                    });
                }
            },
            None => source.worksheets().collect(),
        };

        let mut sheets = Vec::with_capacity(selected.len());
        for sheet in selected {
            let name = SheetNameResolver::resolve(label, sheet.name(), registry);
            let mut destination = Worksheet::new(name.as_str());
            let stats = SheetCopier::copy(sheet, &mut destination)?;
            tracing::debug!(
                file = %file.name,
                source = sheet.name(),
                target = %name,
                cells = stats.cells,
                styled = stats.styled_cells,
                merges = stats.merged_regions,
                "copied sheet"
            );
            workbook.add_existing_worksheet(destination)?;
            sheets.push(name);
        }

        Ok(FileState::Extracted { sheets })
    }
}

/// Combine `files`, taking the sheet named `sheet` from each, or every
/// sheet when `sheet` is empty
pub fn combine(files: &[SourceFile], sheet: &str) -> Result<CombineOutcome, CombineError> {
    CombineOrchestrator::new(CombineOptions::sheet(sheet)).combine(files)
}
