//! Error types for the core library.

use thiserror::Error;

use crate::profile::InvalidReason;

/// Errors reported by an account-storage backend.
///
/// Workers never let these escape: the coordinator turns them into a
/// `Failed` terminal outcome carrying the rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend could not be reached or opened.
    #[error("Account storage is unavailable")]
    Unavailable,

    /// A query against the backend failed.
    #[error("Account query failed: {0}")]
    QueryFailed(String),

    /// The repair stopped on an unrecoverable error.
    ///
    /// Records repaired before the failure stay repaired.
    #[error("Repair failed after {repaired} records were repaired: {detail}")]
    RepairPartialFailure {
        /// What went wrong.
        detail: String,
        /// Number of records already repaired when the failure happened.
        repaired: u64,
    },
}

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The profile path did not pass validation.
    #[error("Invalid profile path: {}", .0.message())]
    InvalidProfilePath(InvalidReason),

    /// The requested action is disabled for the current profile and parser.
    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(&'static str),

    /// No async runtime was available to run jobs on.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_reports_progress_so_far() {
        let err = BackendError::RepairPartialFailure {
            detail: "disk I/O error".to_string(),
            repaired: 17,
        };
        assert_eq!(
            err.to_string(),
            "Repair failed after 17 records were repaired: disk I/O error"
        );
    }

    #[test]
    fn invalid_profile_path_uses_reason_message() {
        let err = Error::InvalidProfilePath(InvalidReason::NotFound);
        assert_eq!(err.to_string(), "Invalid profile path: not found");
    }
}
