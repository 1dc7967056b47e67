//! Result and error types for gridprobe.

use thiserror::Error;

use crate::sort::SortDirection;

/// Result type for gridprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while inspecting a grid
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An expected element never appeared within its timeout
    #[error("Locator not found: {selector} (waited {timeout_ms}ms)")]
    LocatorNotFound {
        /// Selector that was waited for
        selector: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Observed column values violate the expected order
    #[error(
        "Column '{column}' is not sorted {direction}: {left:?} then {right:?} at position {position}; observed {observed:?}"
    )]
    ComparisonFailure {
        /// Column name as given by the caller
        column: String,
        /// Requested direction
        direction: SortDirection,
        /// Index of the left value of the offending pair
        position: usize,
        /// Left value of the offending pair
        left: String,
        /// Right value of the offending pair
        right: String,
        /// Full observed value sequence
        observed: Vec<String>,
    },

    /// A loading indicator did not disappear within the stability timeout
    #[error("Unstable state: {selector} still visible after {timeout_ms}ms")]
    UnstableState {
        /// Loading indicator selector
        selector: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Browser driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No candidate input satisfied the predicate
    #[error("All {tried} candidates exhausted without success")]
    CandidatesExhausted {
        /// Number of candidates tried
        tried: usize,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Build a driver error from anything displayable
    pub fn driver(message: impl std::fmt::Display) -> Self {
        Self::Driver {
            message: message.to_string(),
        }
    }

    /// Whether this error marks a genuine ordering defect in the application
    #[must_use]
    pub const fn is_comparison_failure(&self) -> bool {
        matches!(self, Self::ComparisonFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_failure_message_names_everything() {
        let err = ProbeError::ComparisonFailure {
            column: "Due Date".to_string(),
            direction: SortDirection::Ascending,
            position: 1,
            left: "12/12/2023".to_string(),
            right: "03/01/2023".to_string(),
            observed: vec![
                "01/01/2023".to_string(),
                "12/12/2023".to_string(),
                "03/01/2023".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Due Date"));
        assert!(msg.contains("ascending"));
        assert!(msg.contains("\"12/12/2023\" then \"03/01/2023\""));
        assert!(msg.contains("01/01/2023"));
        assert!(err.is_comparison_failure());
    }

    #[test]
    fn test_locator_not_found_message() {
        let err = ProbeError::LocatorNotFound {
            selector: "thead th".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "Locator not found: thead th (waited 5000ms)"
        );
        assert!(!err.is_comparison_failure());
    }

    #[test]
    fn test_driver_helper() {
        let err = ProbeError::driver("socket closed");
        assert_eq!(err.to_string(), "Driver error: socket closed");
    }
}
