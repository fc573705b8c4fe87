//! Error types for the CLI

use teapot_report::ReportError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Report library error
    #[error("{0}")]
    Report(#[from] ReportError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Operator guidance to print after the error, if any
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Report(ReportError::Decode { .. }) => Some(
                "The event stream must be UTF-8. Re-encode the target's output \
                 (e.g. pipe it through `iconv -t UTF-8`) or fix its locale settings.",
            ),
            _ => None,
        }
    }
}
