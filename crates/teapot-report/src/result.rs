//! Result and error types for report handling.

use thiserror::Error;

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur while collecting, loading or transforming reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report (de)serialization error, including missing fields
    #[error("Report format error: {0}")]
    Json(#[from] serde_json::Error),

    /// Address text that is neither hex nor decimal
    #[error("Invalid address: {value:?}")]
    InvalidAddress {
        /// The offending text
        value: String,
    },

    /// A persisted record whose map key disagrees with its `address` field
    #[error("Record keyed {key} claims address {address}")]
    ContradictoryAddress {
        /// Map key as written
        key: String,
        /// `address` field as written
        address: String,
    },

    /// Two persisted records whose keys name the same address
    #[error("Records {first} and {second} both decode to address {address:#x}")]
    DuplicateAddress {
        /// Decoded address
        address: u64,
        /// Key of the record loaded first
        first: String,
        /// Key of the record that collided with it
        second: String,
    },

    /// An update applied to a record with a different address
    #[error("Updated address does not match: {expected:#x} and {actual:#x}")]
    AddressMismatch {
        /// Address of the record being updated
        expected: u64,
        /// Address carried by the update
        actual: u64,
    },

    /// The input stream is not valid UTF-8
    #[error("Cannot process non-UTF-8 input after line {line}")]
    Decode {
        /// Number of lines successfully read before the failure
        line: u64,
    },

    /// An event line that could not be parsed
    #[error("Malformed event line: {reason}")]
    MalformedEvent {
        /// What was wrong with the line
        reason: String,
    },
}

impl ReportError {
    /// Create an invalid address error
    #[must_use]
    pub fn invalid_address(value: impl Into<String>) -> Self {
        Self::InvalidAddress {
            value: value.into(),
        }
    }

    /// Create a malformed event error
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
        }
    }

    /// Whether ingestion can continue past this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedEvent { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_mismatch_renders_hex() {
        let err = ReportError::AddressMismatch {
            expected: 0x1000,
            actual: 0x2000,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x1000"));
        assert!(msg.contains("0x2000"));
    }

    #[test]
    fn test_invalid_address() {
        let err = ReportError::invalid_address("zz");
        assert!(err.to_string().contains("\"zz\""));
    }

    #[test]
    fn test_only_malformed_is_recoverable() {
        assert!(ReportError::malformed("short").is_recoverable());
        assert!(!ReportError::Decode { line: 3 }.is_recoverable());
        assert!(!ReportError::invalid_address("x").is_recoverable());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ReportError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<u64>("nope").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(err.to_string().contains("Report format"));
    }
}
