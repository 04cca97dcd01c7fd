//! dedup - find duplicate files by content.
//!
//! Files under one or more roots are grouped by size, then files sharing a
//! size are hashed with BLAKE2b-512 and grouped by digest. Each group of two
//! or more paths with the same digest is reported.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::{ErrorKind, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::diagnostics::{DiagnosticSink, StderrSink};
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::TextReport;

/// Run the application, writing the report to stdout and diagnostics to
/// stderr.
///
/// # Errors
///
/// Returns an error for any fatal condition: invalid configuration, a
/// missing or unreadable root, or a hash engine failure.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    run_with(&cli, stdout.lock(), Arc::new(StderrSink))
}

/// Run the application against an arbitrary report writer and sink.
///
/// Nothing is written to `out` unless the whole scan succeeds.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_with<W: Write>(
    cli: &Cli,
    out: W,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<ExitCode> {
    let config = Config::from_cli(cli)?;
    log::debug!("Effective configuration: {:?}", config);

    let finder = DuplicateFinder::new(config.finder_config(), sink);
    let (groups, summary) = finder.find_duplicates_in_paths(&cli.paths)?;

    if summary.has_errors() {
        log::warn!(
            "{} entries and {} files could not be processed",
            summary.entries_failed,
            summary.failed_files
        );
    }

    match TextReport::new(&groups).write_to(out) {
        Ok(()) => {}
        // The reader went away (e.g. `dedup dir | head`); that ends output normally.
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            log::debug!("Report reader closed early: {}", e);
        }
        Err(e) => return Err(e).context("failed to write report"),
    }

    Ok(ExitCode::Success)
}
