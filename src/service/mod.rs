//! # Document Service
//!
//! Orchestrates the lifecycle state machine. Every transition runs the
//! same sequence: validate input, load current state, check the transition
//! precondition, delegate to the store, invalidate the affected cache
//! keys, then publish the event built from the post-mutation state.
//!
//! Cache purges and event publishes run after the store commit and are
//! not transactional with it: a reader can see a stale cached value until
//! the purge lands (bounded by TTL), and a publish failure leaves the
//! committed mutation in place — it is reported to operators, not to the
//! client.

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{keys, CacheStore};
use crate::document::{
    validate, CreateDocumentRequest, Document, DocumentError, DocumentResult, DocumentVersion,
    SearchRequest,
};
use crate::events::{EventPublisher, EventResult};
use crate::observability::{Logger, Timed};
use crate::repository::{AddVersionOutcome, DocumentRepository};

pub mod cached;

pub use cached::{CacheTtls, ReadCache};

/// Lifecycle orchestrator for documents and versions
pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    cache: ReadCache,
    publisher: EventPublisher,
}

impl DocumentService {
    /// Wire the service: repository, cache store with TTLs, publisher.
    ///
    /// The read-through and purge behavior is composed here, visibly, not
    /// attached to the read methods.
    pub fn new(
        repo: Arc<dyn DocumentRepository>,
        cache_store: Arc<dyn CacheStore>,
        ttls: CacheTtls,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            repo,
            cache: ReadCache::new(cache_store, ttls),
            publisher,
        }
    }

    /// Create a document in the live state, seeding version 1
    pub async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> DocumentResult<Document> {
        let timed = Timed::start("create_document");
        let new_doc = validate::create(request)?;

        let document = self.repo.create(new_doc).await?;

        self.invalidate_search().await;
        self.report_publish(self.publisher.document_created(&document).await);

        timed.finish("ok");
        Ok(document)
    }

    /// Fetch one document by id (read-through cached)
    pub async fn get_document(&self, id: &str) -> DocumentResult<Document> {
        let timed = Timed::start("get_document");
        let id = validate::document_id(id)?;

        let key = keys::read_key(keys::GET_DOCUMENT, &id);
        let repo = Arc::clone(&self.repo);
        let document = self
            .cache
            .get_through(&key, self.cache.ttls().document, || async move {
                repo.get_by_id(id).await?.ok_or(DocumentError::NotFound)
            })
            .await?;

        timed.finish("ok");
        Ok(document)
    }

    /// Filtered search (read-through cached)
    pub async fn search_documents(&self, request: &SearchRequest) -> DocumentResult<Vec<Document>> {
        let timed = Timed::start("search_documents");
        let query = validate::search(request)?;

        let key = keys::read_key(keys::SEARCH_DOCUMENTS, &query);
        let repo = Arc::clone(&self.repo);
        let documents = self
            .cache
            .get_through(&key, self.cache.ttls().search, || async move {
                Ok(repo.search(&query).await?)
            })
            .await?;

        timed.finish("ok");
        Ok(documents)
    }

    /// Append the next immutable content version
    pub async fn add_version(
        &self,
        document_id: &str,
        content: &str,
    ) -> DocumentResult<DocumentVersion> {
        let timed = Timed::start("add_version");
        let id = validate::document_id(document_id)?;
        let content = validate::content(content)?;

        // Early precondition check against the source of truth. The store
        // re-checks under its row lock; this pass just fails fast.
        let document = self.repo.get_by_id(id).await?.ok_or(DocumentError::NotFound)?;
        if !document.active {
            return Err(DocumentError::Archived);
        }

        let version = match self.repo.add_version(id, content).await? {
            AddVersionOutcome::Inserted(version) => version,
            AddVersionOutcome::NotFound => return Err(DocumentError::NotFound),
            AddVersionOutcome::Deleted => return Err(DocumentError::Deleted),
            AddVersionOutcome::Archived => return Err(DocumentError::Archived),
        };

        self.invalidate_document(id).await;
        self.report_publish(self.publisher.version_added(&version).await);

        timed.finish("ok");
        Ok(version)
    }

    /// All versions of a document, ascending (read-through cached)
    pub async fn list_versions(&self, document_id: &str) -> DocumentResult<Vec<DocumentVersion>> {
        let timed = Timed::start("list_versions");
        let id = validate::document_id(document_id)?;

        let key = keys::read_key(keys::LIST_VERSIONS, &id);
        let repo = Arc::clone(&self.repo);
        let versions = self
            .cache
            .get_through(&key, self.cache.ttls().versions, || async move {
                Ok(repo.list_versions(id).await?)
            })
            .await?;

        timed.finish("ok");
        Ok(versions)
    }

    /// Archive a live document (Published+Active → Draft+Archived)
    pub async fn archive_document(&self, id: &str) -> DocumentResult<Document> {
        let timed = Timed::start("archive_document");
        let id = validate::document_id(id)?;

        let document = self.repo.get_by_id(id).await?.ok_or(DocumentError::NotFound)?;
        if !document.active {
            return Err(DocumentError::Archived);
        }

        let archived = self
            .repo
            .archive(id)
            .await?
            .ok_or(DocumentError::NotFound)?;

        self.invalidate_document(id).await;
        self.invalidate_search().await;
        self.report_publish(self.publisher.document_archived(&archived).await);

        timed.finish("ok");
        Ok(archived)
    }

    /// Reactivate an archived document (Draft+Archived → Published+Active)
    pub async fn unarchive_document(&self, id: &str) -> DocumentResult<Document> {
        let timed = Timed::start("unarchive_document");
        let id = validate::document_id(id)?;

        let document = self.repo.get_by_id(id).await?.ok_or(DocumentError::NotFound)?;
        if document.active {
            return Err(DocumentError::AlreadyActive);
        }

        let unarchived = self
            .repo
            .unarchive(id)
            .await?
            .ok_or(DocumentError::NotFound)?;

        self.invalidate_document(id).await;
        self.invalidate_search().await;
        self.report_publish(self.publisher.document_unarchived(&unarchived).await);

        timed.finish("ok");
        Ok(unarchived)
    }

    /// Soft-delete a document; terminal
    pub async fn soft_delete_document(&self, id: &str) -> DocumentResult<Document> {
        let timed = Timed::start("soft_delete_document");
        let id = validate::document_id(id)?;

        self.repo.get_by_id(id).await?.ok_or(DocumentError::NotFound)?;

        let deleted = self
            .repo
            .soft_delete(id)
            .await?
            .ok_or(DocumentError::NotFound)?;

        self.invalidate_document(id).await;
        self.invalidate_search().await;
        self.report_publish(self.publisher.document_deleted(&deleted).await);

        timed.finish("ok");
        Ok(deleted)
    }

    /// Drop the single-document keys for one id
    async fn invalidate_document(&self, id: Uuid) {
        self.cache
            .delete(&keys::read_key(keys::GET_DOCUMENT, &id))
            .await;
        self.cache
            .delete(&keys::read_key(keys::LIST_VERSIONS, &id))
            .await;
    }

    /// Drop all cached search results
    async fn invalidate_search(&self) {
        self.cache.purge(&[keys::SEARCH_DOCUMENTS]).await;
    }

    /// Report a publish outcome to operators without failing the mutation
    fn report_publish(&self, result: EventResult<()>) {
        if let Err(e) = result {
            Logger::error("EVENT_PUBLISH_FAILED", &[("error", e.to_string())]);
        }
    }
}
