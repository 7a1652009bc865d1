//! Error types for the ipenforcer library.
//!
//! This module provides the error hierarchy for every stage of an
//! enforcement run, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with an ipenforcer error.
///
/// # Examples
///
/// ```
/// use ipenforcer::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the ipenforcer library.
#[derive(Debug, Error)]
pub enum Error {
    /// Listing the address inventory of a project failed.
    ///
    /// The project is skipped; the run continues with the next one.
    #[error("failed to fetch address inventory for {project}: {source}")]
    FetchFailure {
        /// The project whose inventory could not be fetched.
        project: String,
        /// The underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// A mutating delete request itself failed.
    #[error("failed to delete {resource}: {source}")]
    DeleteFailure {
        /// Description of the resource the delete targeted.
        resource: String,
        /// The underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// An operation reached DONE carrying an error payload.
    #[error("operation {operation} failed: {details}")]
    OperationFailed {
        /// The operation name.
        operation: String,
        /// Flattened error payload reported by the operation.
        details: String,
    },

    /// An operation did not reach DONE within the configured bound.
    #[error("operation {operation} did not complete within {seconds}s")]
    OperationTimeout {
        /// The operation name.
        operation: String,
        /// The number of seconds waited before giving up.
        seconds: u64,
    },

    /// The classifier could not determine a safe action for an address.
    #[error("unsupported address {address}: {reason}")]
    Unsupported {
        /// The address name.
        address: String,
        /// Why no action could be derived.
        reason: String,
    },

    /// The host project identity is unknown or invalid.
    ///
    /// This aborts the entire run since it indicates a misconfigured job.
    #[error("cannot resolve projects for host {project}: {reason}")]
    ProjectResolution {
        /// The host project id.
        project: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The control API answered with a non-success status.
    #[error("API request to {url} failed with status {status}: {message}")]
    Api {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The error message returned by the API.
        message: String,
    },

    /// Credentials could not be obtained.
    #[error("authentication error: {reason}")]
    Auth {
        /// Why credentials were unavailable.
        reason: String,
    },

    /// An HTTP transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body or exclusion line could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

/// Coarse category of a per-address failure, as recorded in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The address could not be classified into a safe action.
    Unsupported,
    /// A delete request failed.
    DeleteFailure,
    /// An operation completed with an error.
    OperationFailed,
    /// An operation did not complete in time.
    OperationTimeout,
    /// Any other error surfaced while processing the address.
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "unsupported"),
            Self::DeleteFailure => write!(f, "delete-failure"),
            Self::OperationFailed => write!(f, "operation-failed"),
            Self::OperationTimeout => write!(f, "operation-timeout"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl Error {
    /// Returns true if this error must abort the whole run.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipenforcer::Error;
    ///
    /// let err = Error::ProjectResolution {
    ///     project: "unknown-host".into(),
    ///     reason: "not configured".into(),
    /// };
    /// assert!(err.is_fatal());
    /// ```
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProjectResolution { .. })
    }

    /// Maps this error to the category recorded for a failed address.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Unsupported { .. } => FailureKind::Unsupported,
            Self::DeleteFailure { .. } => FailureKind::DeleteFailure,
            Self::OperationFailed { .. } => FailureKind::OperationFailed,
            Self::OperationTimeout { .. } => FailureKind::OperationTimeout,
            _ => FailureKind::Other,
        }
    }
}
