//! Lifecycle State-Machine Tests
//!
//! End-to-end transitions through the service:
//! - create → live; archive ⇄ unarchive; soft-delete terminal
//! - add_version gated on the live state
//! - search never returns deleted documents

use std::sync::Arc;

use vellum::cache::MemoryCache;
use vellum::document::{CreateDocumentRequest, SearchRequest};
use vellum::events::{ChannelBroker, EventPublisher};
use vellum::repository::MemoryRepository;
use vellum::service::{CacheTtls, DocumentService};

fn service() -> DocumentService {
    DocumentService::new(
        Arc::new(MemoryRepository::new()),
        Arc::new(MemoryCache::new()),
        CacheTtls::default(),
        EventPublisher::new(Arc::new(ChannelBroker::new())),
    )
}

fn create_request(title: &str) -> CreateDocumentRequest {
    CreateDocumentRequest {
        title: title.to_string(),
        doc_type: "PDF".to_string(),
        url: format!("https://example.com/{}.pdf", title),
    }
}

fn search_for(title: &str) -> SearchRequest {
    SearchRequest {
        query: Some(title.to_string()),
        ..Default::default()
    }
}

// =============================================================================
// Scenario: create → add versions → list
// =============================================================================

#[tokio::test]
async fn test_create_version_list_scenario() {
    let service = service();

    let doc = service.create_document(&create_request("T")).await.unwrap();
    assert!(doc.is_live());
    let id = doc.id.to_string();

    let v = service.add_version(&id, "v1").await.unwrap();
    assert_eq!(v.version, 2); // 1 is the title seed
    let v = service.add_version(&id, "v2").await.unwrap();
    assert_eq!(v.version, 3);

    let versions = service.list_versions(&id).await.unwrap();
    let numbers: Vec<u32> = versions.iter().map(|v| v.version).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

// =============================================================================
// Scenario: archive blocks versioning, unarchive restores it
// =============================================================================

#[tokio::test]
async fn test_archive_unarchive_scenario() {
    let service = service();
    let doc = service.create_document(&create_request("T")).await.unwrap();
    let id = doc.id.to_string();

    let archived = service.archive_document(&id).await.unwrap();
    assert!(!archived.active);
    assert_eq!(archived.status.as_str(), "DRAFT");

    let err = service.add_version(&id, "x").await.unwrap_err();
    assert_eq!(err.code(), "DOCUMENT_ARCHIVED");

    let unarchived = service.unarchive_document(&id).await.unwrap();
    assert!(unarchived.active);
    assert_eq!(unarchived.status.as_str(), "PUBLISHED");

    let v = service.add_version(&id, "x").await.unwrap();
    assert_eq!(v.version, 2);
}

// =============================================================================
// Scenario: soft delete is terminal
// =============================================================================

#[tokio::test]
async fn test_soft_delete_scenario() {
    let service = service();
    let doc = service.create_document(&create_request("T")).await.unwrap();
    let id = doc.id.to_string();

    service.soft_delete_document(&id).await.unwrap();

    let err = service.get_document(&id).await.unwrap_err();
    assert_eq!(err.code(), "DOCUMENT_NOT_FOUND");

    let found = service.search_documents(&search_for("T")).await.unwrap();
    assert!(found.iter().all(|d| d.id != doc.id));
}

#[tokio::test]
async fn test_deleted_document_accepts_no_transition() {
    let service = service();
    let doc = service.create_document(&create_request("T")).await.unwrap();
    let id = doc.id.to_string();

    service.soft_delete_document(&id).await.unwrap();

    assert_eq!(
        service.soft_delete_document(&id).await.unwrap_err().code(),
        "DOCUMENT_NOT_FOUND"
    );
    assert_eq!(
        service.archive_document(&id).await.unwrap_err().code(),
        "DOCUMENT_NOT_FOUND"
    );
    assert_eq!(
        service.unarchive_document(&id).await.unwrap_err().code(),
        "DOCUMENT_NOT_FOUND"
    );
    assert_eq!(
        service.add_version(&id, "x").await.unwrap_err().code(),
        "DOCUMENT_NOT_FOUND"
    );
}

// =============================================================================
// Transition Preconditions
// =============================================================================

#[tokio::test]
async fn test_rearchive_and_reactivate_rejected() {
    let service = service();
    let doc = service.create_document(&create_request("T")).await.unwrap();
    let id = doc.id.to_string();

    assert_eq!(
        service.unarchive_document(&id).await.unwrap_err().code(),
        "DOCUMENT_ALREADY_ACTIVE"
    );

    service.archive_document(&id).await.unwrap();
    assert_eq!(
        service.archive_document(&id).await.unwrap_err().code(),
        "DOCUMENT_ARCHIVED"
    );
}

#[tokio::test]
async fn test_archived_documents_remain_searchable() {
    let service = service();
    let doc = service
        .create_document(&create_request("keepme"))
        .await
        .unwrap();
    service.archive_document(&doc.id.to_string()).await.unwrap();

    let found = service
        .search_documents(&search_for("keepme"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].is_archived());

    // And filterable by the archived state.
    let inactive_only = SearchRequest {
        active: Some(false),
        ..Default::default()
    };
    let found = service.search_documents(&inactive_only).await.unwrap();
    assert_eq!(found.len(), 1);
}

// =============================================================================
// Search Semantics
// =============================================================================

#[tokio::test]
async fn test_search_explicit_deleted_filter_rejected() {
    let service = service();
    let request = SearchRequest {
        status: Some("DELETED".to_string()),
        ..Default::default()
    };
    let err = service.search_documents(&request).await.unwrap_err();
    assert_eq!(err.code(), "DOCUMENT_DELETED");
}

#[tokio::test]
async fn test_search_pagination_is_stable() {
    let service = service();
    for n in 0..7 {
        service
            .create_document(&create_request(&format!("page-{}", n)))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for offset in [0u64, 3, 6] {
        let request = SearchRequest {
            query: Some("page-".to_string()),
            limit: Some(3),
            offset: Some(offset),
            ..Default::default()
        };
        for doc in service.search_documents(&request).await.unwrap() {
            seen.push(doc.id);
        }
    }

    assert_eq!(seen.len(), 7);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 7, "pages must not overlap");
}
