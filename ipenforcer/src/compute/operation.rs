//! Asynchronous operation handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Queued.
    Pending,
    /// In progress.
    Running,
    /// Terminal, possibly with an error payload.
    Done,
    /// A status this client does not know; treated as not yet done.
    #[serde(other)]
    Unknown,
}

/// One entry of an operation's error payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationErrorDetail {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Error payload carried by a completed operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct OperationError {
    /// The individual errors.
    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "unspecified error");
        }
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

/// An opaque handle to a mutation in progress.
///
/// Created by a delete call, polled until DONE, then discarded.
///
/// # Examples
///
/// ```
/// use ipenforcer::compute::{Operation, OperationStatus};
///
/// let op: Operation = serde_json::from_str(
///     r#"{"name": "operation-123", "status": "RUNNING", "operationType": "delete"}"#,
/// )
/// .unwrap();
/// assert_eq!(op.status, OperationStatus::Running);
/// assert!(!op.is_done());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation name, used to poll it.
    pub name: String,
    /// Current status.
    pub status: OperationStatus,
    /// Error payload, only meaningful once DONE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    /// The kind of mutation (`delete`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    /// URL of the resource being mutated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
}

impl Operation {
    /// Creates an operation handle with the given status and no error.
    #[must_use]
    pub fn new(name: impl Into<String>, status: OperationStatus) -> Self {
        Self {
            name: name.into(),
            status,
            error: None,
            operation_type: None,
            target_link: None,
        }
    }

    /// Creates a completed, successful operation.
    #[must_use]
    pub fn done(name: impl Into<String>) -> Self {
        Self::new(name, OperationStatus::Done)
    }

    /// Creates a pending operation.
    #[must_use]
    pub fn pending(name: impl Into<String>) -> Self {
        Self::new(name, OperationStatus::Pending)
    }

    /// Attaches an error payload.
    #[must_use]
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error
            .get_or_insert_with(OperationError::default)
            .errors
            .push(OperationErrorDetail {
                code: code.into(),
                message: message.into(),
            });
        self
    }

    /// Returns true once the operation reached its terminal state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }
}
