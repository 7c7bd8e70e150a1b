//! # Repository Errors
//!
//! Persistence failures, kept distinct from the domain error taxonomy.
//! A lock timeout or constraint violation surfaces as a generic store
//! failure to callers; it never masquerades as a lifecycle rejection.

use thiserror::Error;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence-layer errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Transaction could not begin, commit, or roll back
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Row lock was not acquired within the configured wait budget
    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),

    /// Unique/foreign-key constraint violated
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Underlying driver failure
    #[error("Store driver error: {0}")]
    Driver(String),
}

impl RepositoryError {
    /// Create a transaction error
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create a driver error
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) => {
                let code = db.code().unwrap_or_default();
                // 55P03 = lock_not_available (lock_timeout expired),
                // 23xxx = integrity constraint violations.
                if code == "55P03" {
                    Self::LockTimeout(db.message().to_string())
                } else if code.starts_with("23") {
                    Self::Constraint(db.message().to_string())
                } else {
                    Self::Driver(db.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut => Self::Transaction("connection pool timed out".to_string()),
            _ => Self::Driver(e.to_string()),
        }
    }
}
