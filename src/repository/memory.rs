//! # In-Memory Repository
//!
//! Stores documents and versions in process memory behind a single mutex.
//! The mutex is what upholds the version-allocation invariant here: with no
//! database row lock to rely on, the whole read-max-insert sequence runs
//! under one guard.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use async_trait::async_trait;

use crate::document::{DocStatus, Document, DocumentVersion, NewDocument, SearchQuery};

use super::errors::RepositoryResult;
use super::{AddVersionOutcome, DocumentRepository};

#[derive(Debug, Default)]
struct Tables {
    documents: HashMap<Uuid, Document>,
    versions: HashMap<Uuid, Vec<DocumentVersion>>,
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, deleted included (test helper)
    pub async fn document_count(&self) -> usize {
        self.tables.lock().await.documents.len()
    }
}

#[async_trait]
impl DocumentRepository for MemoryRepository {
    async fn create(&self, new_doc: NewDocument) -> RepositoryResult<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            title: new_doc.title,
            doc_type: new_doc.doc_type,
            status: DocStatus::Published,
            active: true,
            url: new_doc.url,
            created_at: now,
            updated_at: now,
        };

        let seed = DocumentVersion {
            id: Uuid::new_v4(),
            document_id: document.id,
            version: 1,
            content: document.title.clone(),
            created_at: now,
        };

        // Single guard covers both inserts; there is no partial state.
        let mut tables = self.tables.lock().await;
        tables.documents.insert(document.id, document.clone());
        tables.versions.insert(document.id, vec![seed]);

        Ok(document)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .documents
            .get(&id)
            .filter(|d| !d.is_deleted())
            .cloned())
    }

    async fn search(&self, query: &SearchQuery) -> RepositoryResult<Vec<Document>> {
        let tables = self.tables.lock().await;

        let mut matches: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| !d.is_deleted())
            .filter(|d| match &query.title {
                Some(q) => d.title.to_lowercase().contains(&q.to_lowercase()),
                None => true,
            })
            .filter(|d| query.doc_type.map_or(true, |t| d.doc_type == t))
            .filter(|d| query.status.map_or(true, |s| d.status == s))
            .filter(|d| query.active.map_or(true, |a| d.active == a))
            .cloned()
            .collect();

        // Stable ordering across pages for a fixed data set.
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(matches
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn add_version(
        &self,
        document_id: Uuid,
        content: &str,
    ) -> RepositoryResult<AddVersionOutcome> {
        let mut tables = self.tables.lock().await;

        // Preconditions re-checked under the guard, mirroring the locked
        // transaction in the Postgres implementation.
        let gate = tables
            .documents
            .get(&document_id)
            .map(|d| (d.is_deleted(), d.active));
        match gate {
            None => return Ok(AddVersionOutcome::NotFound),
            Some((true, _)) => return Ok(AddVersionOutcome::Deleted),
            Some((_, false)) => return Ok(AddVersionOutcome::Archived),
            Some(_) => {}
        }

        let versions = tables.versions.entry(document_id).or_default();
        let next = versions.iter().map(|v| v.version).max().unwrap_or(0) + 1;
        let version = DocumentVersion {
            id: Uuid::new_v4(),
            document_id,
            version: next,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        versions.push(version.clone());

        Ok(AddVersionOutcome::Inserted(version))
    }

    async fn archive(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .documents
            .get_mut(&id)
            .filter(|d| !d.is_deleted())
            .map(|d| {
                d.active = false;
                d.status = DocStatus::Draft;
                d.updated_at = Utc::now();
                d.clone()
            }))
    }

    async fn unarchive(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .documents
            .get_mut(&id)
            .filter(|d| !d.is_deleted())
            .map(|d| {
                d.active = true;
                d.status = DocStatus::Published;
                d.updated_at = Utc::now();
                d.clone()
            }))
    }

    async fn soft_delete(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .documents
            .get_mut(&id)
            .filter(|d| !d.is_deleted())
            .map(|d| {
                d.status = DocStatus::Deleted;
                d.active = false;
                d.updated_at = Utc::now();
                d.clone()
            }))
    }

    async fn list_versions(&self, document_id: Uuid) -> RepositoryResult<Vec<DocumentVersion>> {
        let tables = self.tables.lock().await;
        let mut versions = tables
            .versions
            .get(&document_id)
            .cloned()
            .unwrap_or_default();
        versions.sort_by_key(|v| v.version);
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocType;

    fn new_doc(title: &str) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            doc_type: DocType::Pdf,
            url: format!("https://example.com/{}.pdf", title),
        }
    }

    #[tokio::test]
    async fn test_create_is_live_and_seeds_version_one() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("report")).await.unwrap();

        assert!(doc.is_live());

        let versions = repo.list_versions(doc.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version, 1);
        assert_eq!(versions[0].content, "report");
    }

    #[tokio::test]
    async fn test_get_excludes_deleted() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("gone")).await.unwrap();

        repo.soft_delete(doc.id).await.unwrap();
        assert!(repo.get_by_id(doc.id).await.unwrap().is_none());
        // Row still exists underneath; it is only excluded.
        assert_eq!(repo.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_add_version_allocates_sequentially() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("seq")).await.unwrap();

        for expected in 2..=5u32 {
            match repo.add_version(doc.id, "body").await.unwrap() {
                AddVersionOutcome::Inserted(v) => assert_eq!(v.version, expected),
                other => panic!("expected insert, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_add_version_gates() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("gated")).await.unwrap();

        repo.archive(doc.id).await.unwrap();
        assert_eq!(
            repo.add_version(doc.id, "x").await.unwrap(),
            AddVersionOutcome::Archived
        );

        repo.soft_delete(doc.id).await.unwrap();
        assert_eq!(
            repo.add_version(doc.id, "x").await.unwrap(),
            AddVersionOutcome::Deleted
        );

        assert_eq!(
            repo.add_version(Uuid::new_v4(), "x").await.unwrap(),
            AddVersionOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_archive_unarchive_roundtrip() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("flip")).await.unwrap();

        let archived = repo.archive(doc.id).await.unwrap().unwrap();
        assert!(archived.is_archived());
        assert!(archived.updated_at >= doc.updated_at);

        let live = repo.unarchive(doc.id).await.unwrap().unwrap();
        assert!(live.is_live());
    }

    #[tokio::test]
    async fn test_soft_delete_is_terminal() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("final")).await.unwrap();

        assert!(repo.soft_delete(doc.id).await.unwrap().is_some());
        // Second delete sees no non-deleted row.
        assert!(repo.soft_delete(doc.id).await.unwrap().is_none());
        assert!(repo.archive(doc.id).await.unwrap().is_none());
        assert!(repo.unarchive(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_filters_and_pagination() {
        let repo = MemoryRepository::new();
        for i in 0..5 {
            repo.create(new_doc(&format!("report-{}", i))).await.unwrap();
        }
        repo.create(NewDocument {
            title: "notes".to_string(),
            doc_type: DocType::Txt,
            url: "https://example.com/notes.txt".to_string(),
        })
        .await
        .unwrap();

        let query = SearchQuery {
            title: Some("REPORT".to_string()),
            doc_type: None,
            status: None,
            active: None,
            limit: 3,
            offset: 0,
        };
        let page1 = repo.search(&query).await.unwrap();
        assert_eq!(page1.len(), 3);

        let query2 = SearchQuery {
            offset: 3,
            ..query.clone()
        };
        let page2 = repo.search(&query2).await.unwrap();
        assert_eq!(page2.len(), 2);

        // Pages never overlap for a fixed data set.
        for d in &page2 {
            assert!(page1.iter().all(|p| p.id != d.id));
        }

        let by_type = SearchQuery {
            title: None,
            doc_type: Some(DocType::Txt),
            status: None,
            active: None,
            limit: 10,
            offset: 0,
        };
        assert_eq!(repo.search(&by_type).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_excludes_deleted() {
        let repo = MemoryRepository::new();
        let doc = repo.create(new_doc("doomed")).await.unwrap();
        repo.soft_delete(doc.id).await.unwrap();

        let query = SearchQuery {
            title: Some("doomed".to_string()),
            doc_type: None,
            status: None,
            active: None,
            limit: 10,
            offset: 0,
        };
        assert!(repo.search(&query).await.unwrap().is_empty());
    }
}
