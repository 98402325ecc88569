//! sheetmerge CLI - combine sheets from many workbooks into one

use anyhow::{Context, Result};
use clap::Parser;
use sheetmerge::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetmerge")]
#[command(
    author,
    version,
    about = "Combine sheets from many Excel workbooks into one, keeping formatting and formulas"
)]
struct Cli {
    /// Input workbooks (.xlsx), processed in the order given
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Sheet to take from every input (default: all sheets)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Output workbook
    #[arg(short, long, default_value = "combined.xlsx")]
    output: PathBuf,

    /// Do not print progress
    #[arg(short, long)]
    quiet: bool,
}

/// Prints progress lines to stderr
struct StderrProgress;

impl ProgressObserver for StderrProgress {
    fn file_started(&mut self, index: usize, total: usize, name: &str) {
        eprintln!("[{}/{}] Processing {} ...", index + 1, total, name);
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(inputs = cli.inputs.len(), sheet = ?cli.sheet, "starting");
    run(&cli)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut files = Vec::with_capacity(cli.inputs.len());
    let mut read_warnings = Vec::new();
    for path in &cli.inputs {
        match SourceFile::from_path(path) {
            Ok(file) => files.push(file),
            // Same treatment as a file that cannot be decoded
            Err(e) => read_warnings.push(format!("Could not read {}: {}", path.display(), e)),
        }
    }

    let options = CombineOptions {
        sheet: cli.sheet.clone(),
    };
    let mut progress = StderrProgress;
    let mut orchestrator = CombineOrchestrator::new(options);
    if !cli.quiet {
        orchestrator = orchestrator.with_observer(&mut progress);
    }

    let outcome = if files.is_empty() {
        // Every path failed to open; there is nothing to combine
        None
    } else {
        Some(orchestrator.combine(&files).context("Failed to combine workbooks")?)
    };

    for warning in read_warnings
        .iter()
        .chain(outcome.iter().flat_map(|o| o.warnings.iter()))
    {
        eprintln!("warning: {}", warning);
    }

    let workbook = match &outcome {
        Some(outcome) => &outcome.workbook,
        None => {
            eprintln!("error: {}", PersistError::EmptyResult);
            return Ok(ExitCode::FAILURE);
        }
    };

    match persist_file(workbook, &cli.output) {
        Ok(()) => {
            tracing::info!(
                output = %cli.output.display(),
                sheets = workbook.sheet_count(),
                "combined workbook written"
            );
            if !cli.quiet {
                eprintln!(
                    "Wrote {} sheet(s) to '{}'",
                    workbook.sheet_count(),
                    cli.output.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(PersistError::EmptyResult) => {
            eprintln!("error: {}", PersistError::EmptyResult);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to write '{}'", cli.output.display())),
    }
}
