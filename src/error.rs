//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Exit codes for the dedup binary.
///
/// - 0: Success (completed, with or without duplicates or per-file errors)
/// - 1: General error (fatal condition: bad root, config, hash engine)
/// - 2: Usage error (no paths or invalid arguments)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed.
    Success = 0,
    /// General error: A fatal condition stopped the run.
    GeneralError = 1,
    /// Usage error: The command line was invalid.
    Usage = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DD000",
            Self::GeneralError => "DD001",
            Self::Usage => "DD002",
        }
    }

    /// Exit code for a fatal error returned by the application.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::NoPaths) => Self::Usage,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}

/// Whether the error was already rendered on stderr by the diagnostics sink.
#[must_use]
pub fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<FinderError>()
        .is_some_and(FinderError::is_reported)
}
