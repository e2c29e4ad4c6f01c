//! Exit codes and structured error reports.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: Success (every file was identified)
/// - 1: General error (configuration, arguments, unexpected failure)
/// - 3: Partial success (some files could not be read)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Every requested file was processed.
    Success = 0,
    /// An unexpected error stopped the run.
    GeneralError = 1,
    /// The run completed but some files were unreadable.
    PartialSuccess = 3,
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
            Self::Success => "DP000",
            Self::GeneralError => "DP001",
            Self::PartialSuccess => "DP003",
        }
    }
}

/// Error report written to stderr with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DP001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Build a report from an anyhow error chain.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
