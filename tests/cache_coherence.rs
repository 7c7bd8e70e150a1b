//! Cache Coherence Tests
//!
//! The cache is a strict performance optimization:
//! - with the cache store unavailable, every read returns exactly what the
//!   no-outage path returns
//! - every mutation purges the keys it affects, so the next read is a miss
//!   that reflects the new state

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vellum::cache::{keys, CacheError, CacheResult, CacheStore, MemoryCache};
use vellum::document::{CreateDocumentRequest, SearchRequest};
use vellum::events::{ChannelBroker, EventPublisher};
use vellum::repository::MemoryRepository;
use vellum::service::{CacheTtls, DocumentService};

/// Cache store double whose every operation fails
struct OutageCache;

#[async_trait]
impl CacheStore for OutageCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::unavailable("simulated outage"))
    }
    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::unavailable("simulated outage"))
    }
    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::unavailable("simulated outage"))
    }
    async fn purge_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        Err(CacheError::unavailable("simulated outage"))
    }
}

fn service_with(cache: Arc<dyn CacheStore>) -> DocumentService {
    DocumentService::new(
        Arc::new(MemoryRepository::new()),
        cache,
        CacheTtls::default(),
        EventPublisher::new(Arc::new(ChannelBroker::new())),
    )
}

fn create_request(title: &str) -> CreateDocumentRequest {
    CreateDocumentRequest {
        title: title.to_string(),
        doc_type: "TXT".to_string(),
        url: format!("https://example.com/{}.txt", title),
    }
}

// =============================================================================
// Outage Equivalence
// =============================================================================

/// Every read works identically with the cache store down.
#[tokio::test]
async fn test_reads_identical_during_outage() {
    let cached = service_with(Arc::new(MemoryCache::new()));
    let outage = service_with(Arc::new(OutageCache));

    for service in [&cached, &outage] {
        let doc = service
            .create_document(&create_request("steady"))
            .await
            .unwrap();
        let id = doc.id.to_string();
        service.add_version(&id, "v2").await.unwrap();

        let fetched = service.get_document(&id).await.unwrap();
        assert_eq!(fetched.title, "steady");

        let versions = service.list_versions(&id).await.unwrap();
        assert_eq!(versions.len(), 2);

        let found = service
            .search_documents(&SearchRequest {
                query: Some("steady".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}

/// Mutations succeed during an outage; purges fail open.
#[tokio::test]
async fn test_mutations_survive_outage() {
    let service = service_with(Arc::new(OutageCache));

    let doc = service
        .create_document(&create_request("robust"))
        .await
        .unwrap();
    let id = doc.id.to_string();

    service.archive_document(&id).await.unwrap();
    service.unarchive_document(&id).await.unwrap();
    service.add_version(&id, "still works").await.unwrap();
    service.soft_delete_document(&id).await.unwrap();

    assert_eq!(
        service.get_document(&id).await.unwrap_err().code(),
        "DOCUMENT_NOT_FOUND"
    );
}

// =============================================================================
// Purge on Mutation
// =============================================================================

/// A served read populates the cache; the next mutation purges it.
#[tokio::test]
async fn test_mutation_purges_document_keys() {
    let cache = Arc::new(MemoryCache::new());
    let service = service_with(cache.clone());

    let doc = service
        .create_document(&create_request("purge-me"))
        .await
        .unwrap();
    let id = doc.id.to_string();

    // Populate both single-document keys.
    service.get_document(&id).await.unwrap();
    service.list_versions(&id).await.unwrap();
    let doc_key = keys::read_key(keys::GET_DOCUMENT, &doc.id);
    let versions_key = keys::read_key(keys::LIST_VERSIONS, &doc.id);
    assert!(cache.get(&doc_key).await.unwrap().is_some());
    assert!(cache.get(&versions_key).await.unwrap().is_some());

    service.add_version(&id, "new content").await.unwrap();

    assert!(cache.get(&doc_key).await.unwrap().is_none());
    assert!(cache.get(&versions_key).await.unwrap().is_none());

    // The re-read reflects the new state.
    let versions = service.list_versions(&id).await.unwrap();
    assert_eq!(versions.len(), 2);
}

/// Archive purges search results so the next search sees the flip.
#[tokio::test]
async fn test_archive_purges_search_results() {
    let cache = Arc::new(MemoryCache::new());
    let service = service_with(cache.clone());

    let doc = service
        .create_document(&create_request("listed"))
        .await
        .unwrap();

    let active_only = SearchRequest {
        active: Some(true),
        ..Default::default()
    };
    let found = service.search_documents(&active_only).await.unwrap();
    assert_eq!(found.len(), 1);

    service.archive_document(&doc.id.to_string()).await.unwrap();

    let found = service.search_documents(&active_only).await.unwrap();
    assert!(found.is_empty(), "stale search result after archive");
}

/// Cached reads actually serve from the cache between mutations.
#[tokio::test]
async fn test_read_serves_cached_value() {
    let cache = Arc::new(MemoryCache::new());
    let service = service_with(cache.clone());

    let doc = service
        .create_document(&create_request("warm"))
        .await
        .unwrap();
    let id = doc.id.to_string();

    let first = service.get_document(&id).await.unwrap();

    // Poison the cached entry to prove the second read comes from cache.
    let key = keys::read_key(keys::GET_DOCUMENT, &doc.id);
    let mut poisoned = first.clone();
    poisoned.title = "from-cache".to_string();
    cache
        .set(
            &key,
            serde_json::to_string(&poisoned).unwrap(),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    let second = service.get_document(&id).await.unwrap();
    assert_eq!(second.title, "from-cache");
}

/// Deleting a document clears its cached reads.
#[tokio::test]
async fn test_soft_delete_purges_cached_document() {
    let cache = Arc::new(MemoryCache::new());
    let service = service_with(cache.clone());

    let doc = service
        .create_document(&create_request("cached-then-gone"))
        .await
        .unwrap();
    let id = doc.id.to_string();

    service.get_document(&id).await.unwrap();
    service.soft_delete_document(&id).await.unwrap();

    // The cached copy is gone; the read consults the store and 404s.
    assert_eq!(
        service.get_document(&id).await.unwrap_err().code(),
        "DOCUMENT_NOT_FOUND"
    );
}
