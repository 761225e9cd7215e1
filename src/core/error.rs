//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::job::JobId;

/// Coarse classification of a [`WorkloadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced resource or job does not exist.
    NotFound,
    /// The target id is already present.
    AlreadyExists,
    /// The account policy rejected the request.
    PolicyViolation,
    /// The job is in a status that forbids the operation.
    InvalidState,
    /// Storage or execution backend failed.
    BackendFailure,
}

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Resource id has never been attached.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    /// Job id is unknown to both the scheduler and the record store.
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    /// Attach targeted an id that is already attached.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Request exceeds what the account type allows.
    #[error("resource request illegal: {0}")]
    PolicyViolation(String),
    /// Operation not allowed for the job's current status or owner.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Job was cancelled before it could be allocated.
    #[error("job {0} was cancelled")]
    Cancelled(JobId),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl WorkloadError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceNotFound(_) | Self::JobNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::PolicyViolation(_) => ErrorKind::PolicyViolation,
            Self::InvalidState(_) | Self::Cancelled(_) => ErrorKind::InvalidState,
            Self::Backend(_) | Self::Serialization(_) => ErrorKind::BackendFailure,
        }
    }
}

impl From<serde_json::Error> for WorkloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias used throughout the library.
pub type WorkloadResult<T> = Result<T, WorkloadError>;

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
