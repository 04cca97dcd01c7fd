//! Diagnostics reporting for recoverable and fatal scan events.
//!
//! The scanning and hashing stages never write to the console directly.
//! They report structured [`Diagnostic`] events to a [`DiagnosticSink`]
//! supplied by the caller. The binary uses [`StderrSink`] to render them
//! as text; tests use [`CollectingSink`] to assert on the events.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// A structured event raised while scanning or hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A non-regular entry (symlink, device, socket, ...) was excluded.
    EntrySkipped {
        /// Path of the skipped entry
        path: PathBuf,
    },
    /// An entry could not be classified or sized during traversal.
    EntryFailed {
        /// Path of the failing entry
        path: PathBuf,
        /// Description of the failure
        error: String,
    },
    /// A candidate could not be opened or fully read while hashing.
    HashFailed {
        /// Path of the candidate
        path: PathBuf,
        /// Description of the failure
        error: String,
    },
    /// The hashing engine could not be initialized. Fatal for the run.
    EngineInitFailed {
        /// Description of the failure
        error: String,
    },
}

impl Diagnostic {
    /// Path the event refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::EntrySkipped { path }
            | Self::EntryFailed { path, .. }
            | Self::HashFailed { path, .. } => Some(path),
            Self::EngineInitFailed { .. } => None,
        }
    }

    /// Whether the event terminates the run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EngineInitFailed { .. })
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntrySkipped { path } => write!(f, "Skipping entry: {:?}", path),
            Self::EntryFailed { path, error } => {
                write!(f, "error: failed to process {:?}: {}", path, error)
            }
            Self::HashFailed { path, error } => {
                write!(f, "error: failed to hash {:?}: {}", path, error)
            }
            Self::EngineInitFailed { error } => write!(f, "error: {}", error),
        }
    }
}

/// Receiver for diagnostic events.
///
/// Implementations must be thread-safe so a sink can be shared with
/// worker threads.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per event.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Sink that renders each event as one line on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, diagnostic: &Diagnostic) {
        // Whole line under one lock so concurrent reports never interleave.
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = writeln!(stderr, "{}", diagnostic) {
            log::debug!("Failed to write diagnostic: {}", e);
        }
    }
}

/// Sink that records every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events reported so far.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of events reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    /// Whether no events were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic.clone());
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}
