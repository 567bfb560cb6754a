//! Workflow and storage error types.

use crate::ids::DocumentId;
use thiserror::Error;

/// The kind of entity a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A task template.
    Template,
    /// A task instance.
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Template => write!(f, "Template"),
            EntityKind::Task => write!(f, "Task"),
        }
    }
}

/// Errors raised by a [`DocumentStore`](crate::DocumentStore).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// The store is not configured or cannot be reached.
    #[error("{0}")]
    Unavailable(String),

    /// The document changed since it was read.
    #[error("Document {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        /// The document being updated.
        id: DocumentId,
        /// The version the caller read.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// A stored document does not have the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A value could not be converted to or from its document form.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by template and task operations.
///
/// # Non-Exhaustive
///
/// Always include a wildcard arm when matching:
///
/// ```
/// use shinsa_core::WorkflowError;
///
/// fn status_code(error: &WorkflowError) -> u16 {
///     match error {
///         WorkflowError::NotFound { .. } => 404,
///         WorkflowError::InvalidArgument(_) | WorkflowError::InvalidTemplate(_) => 400,
///         WorkflowError::Conflict(_) => 409,
///         _ => 500,
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WorkflowError {
    /// A template or task identifier did not resolve.
    #[error("{kind} not found")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The identifier that failed to resolve.
        id: DocumentId,
    },

    /// A step index or action was rejected.
    #[error("{0}")]
    InvalidArgument(String),

    /// A template failed structural validation.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Storage is not configured or not reachable.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// The task was modified by another request between read and write.
    #[error("{0}")]
    Conflict(String),

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl WorkflowError {
    /// Shorthand for a [`WorkflowError::NotFound`].
    pub fn not_found(kind: EntityKind, id: &DocumentId) -> Self {
        WorkflowError::NotFound {
            kind,
            id: id.clone(),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(msg) => WorkflowError::ServiceUnavailable(msg),
            conflict @ StoreError::VersionConflict { .. } => {
                WorkflowError::Conflict(conflict.to_string())
            }
            other => WorkflowError::Storage(other),
        }
    }
}

/// Result alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
