//! Document Error Taxonomy
//!
//! Domain errors carry a stable code and a transport-agnostic severity.
//! The HTTP boundary maps severity to response status; the core never
//! mentions transports.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Transport-independent error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Malformed or disallowed input
    ClientFault,
    /// Document absent or excluded as deleted
    NotFound,
    /// Valid request rejected by the current lifecycle state
    Conflict,
    /// Persistence failure outside the domain taxonomy
    Internal,
}

/// Domain errors for document operations
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document absent, or excluded because it is deleted
    #[error("Document not found")]
    NotFound,

    /// Operation attempted on a terminal (deleted) document
    #[error("Document does not exist")]
    Deleted,

    /// Mutating operation attempted on an inactive document
    #[error("Document is archived")]
    Archived,

    /// Unarchive attempted on an already-active document
    #[error("Document is already active")]
    AlreadyActive,

    /// Schema or format violation, rejected before any store call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Disallowed version operation
    #[error("Cannot add version to this document")]
    VersionNotAllowed,

    /// Store transaction failure (lock timeout, constraint, driver)
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl DocumentError {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Stable error code for API responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "DOCUMENT_NOT_FOUND",
            Self::Deleted => "DOCUMENT_DELETED",
            Self::Archived => "DOCUMENT_ARCHIVED",
            Self::AlreadyActive => "DOCUMENT_ALREADY_ACTIVE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::VersionNotAllowed => "VERSION_NOT_ALLOWED",
            Self::Store(_) => "STORE_FAILURE",
        }
    }

    /// Transport-agnostic severity class
    pub fn severity(&self) -> Severity {
        match self {
            Self::NotFound => Severity::NotFound,
            Self::Deleted => Severity::Conflict,
            Self::Archived => Severity::Conflict,
            Self::AlreadyActive => Severity::Conflict,
            Self::InvalidInput(_) => Severity::ClientFault,
            Self::VersionNotAllowed => Severity::ClientFault,
            Self::Store(_) => Severity::Internal,
        }
    }

    /// HTTP status code derived from severity
    pub fn status_code(&self) -> u16 {
        match self.severity() {
            Severity::ClientFault => 400,
            Severity::NotFound => 404,
            Severity::Conflict => 409,
            Severity::Internal => 500,
        }
    }
}
