//! # Document Store
//!
//! Transactional persistence for documents and their versions, behind a
//! storage-agnostic trait. Two implementations:
//!
//! - [`MemoryRepository`]: in-process store guarded by a single mutex,
//!   used by tests and the default dev mode
//! - [`PgRepository`]: Postgres via sqlx, with row-level `FOR UPDATE`
//!   locking for version allocation
//!
//! The store owns the version-allocation protocol: the next version number
//! is computed from the current maximum under the same exclusive lock as
//! the insert, so concurrent writers on one document serialize and the
//! per-document sequence stays gap-free.

use async_trait::async_trait;
use uuid::Uuid;

use crate::document::{Document, DocumentVersion, NewDocument, SearchQuery};

pub mod errors;
pub mod memory;
pub mod postgres;

pub use errors::{RepositoryError, RepositoryResult};
pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Outcome of a version-allocation attempt
///
/// Preconditions are re-checked inside the locked transaction, so the
/// store itself reports the lifecycle condition it observed under the
/// lock rather than trusting the caller's earlier check.
#[derive(Debug, Clone, PartialEq)]
pub enum AddVersionOutcome {
    /// Version row inserted and committed
    Inserted(DocumentVersion),
    /// No matching document row
    NotFound,
    /// Document is terminal
    Deleted,
    /// Document is inactive
    Archived,
}

/// Transactional document store contract
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document in the live state and, atomically in the same
    /// transaction, version 1 seeded with the title. Both succeed or both
    /// roll back.
    async fn create(&self, new_doc: NewDocument) -> RepositoryResult<Document>;

    /// Fetch a document by id. Deleted documents are excluded.
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Document>>;

    /// AND-combined filtered search. Deleted documents are always excluded;
    /// ordering is stable across pages for a fixed data set.
    async fn search(&self, query: &SearchQuery) -> RepositoryResult<Vec<Document>>;

    /// Allocate and insert the next version for a document.
    ///
    /// Reads the document row under an exclusive lock, re-checks the
    /// lifecycle preconditions inside the locked transaction, computes
    /// `max(version) + 1` under the same lock, and inserts. The lock is
    /// held only for this read-max-insert sequence.
    async fn add_version(
        &self,
        document_id: Uuid,
        content: &str,
    ) -> RepositoryResult<AddVersionOutcome>;

    /// Archive: active=false, status=DRAFT, bump updated_at.
    /// Returns the post-mutation state, or None if no non-deleted row matched.
    async fn archive(&self, id: Uuid) -> RepositoryResult<Option<Document>>;

    /// Unarchive: active=true, status=PUBLISHED, bump updated_at.
    async fn unarchive(&self, id: Uuid) -> RepositoryResult<Option<Document>>;

    /// Soft delete: status=DELETED, active=false, bump updated_at. Terminal.
    async fn soft_delete(&self, id: Uuid) -> RepositoryResult<Option<Document>>;

    /// All versions of a document, ascending by version number.
    async fn list_versions(&self, document_id: Uuid) -> RepositoryResult<Vec<DocumentVersion>>;
}
