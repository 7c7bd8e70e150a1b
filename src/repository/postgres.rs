//! # Postgres Repository
//!
//! sqlx-backed implementation of the document store. Version allocation
//! takes the document row with `SELECT ... FOR UPDATE` inside a
//! transaction, re-checks the lifecycle preconditions under that lock,
//! computes `MAX(version) + 1` in the same transaction, and inserts.
//! Concurrent writers on the same document serialize on the row lock;
//! writers on different documents do not contend.
//!
//! `lock_timeout` is set per transaction so a stalled peer cannot block a
//! writer indefinitely; expiry surfaces as `RepositoryError::LockTimeout`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use async_trait::async_trait;

use crate::document::{DocStatus, DocType, Document, DocumentVersion, NewDocument, SearchQuery};

use super::errors::{RepositoryError, RepositoryResult};
use super::{AddVersionOutcome, DocumentRepository};

const DOCUMENT_COLUMNS: &str = "id, title, doc_type, status, active, url, created_at, updated_at";

/// Default bound on row-lock waits
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// Postgres-backed document store
pub struct PgRepository {
    pool: PgPool,
    lock_wait: Duration,
}

impl PgRepository {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    /// Connect to the given database URL
    pub async fn connect(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Override the row-lock wait budget
    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    /// Create the tables if they do not exist yet
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id          UUID PRIMARY KEY,
                title       TEXT NOT NULL,
                doc_type    TEXT NOT NULL,
                status      TEXT NOT NULL,
                active      BOOLEAN NOT NULL,
                url         TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_versions (
                id          UUID PRIMARY KEY,
                document_id UUID NOT NULL REFERENCES documents(id),
                version     INTEGER NOT NULL CHECK (version > 0),
                content     TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL,
                UNIQUE (document_id, version)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn document_from_row(row: &PgRow) -> RepositoryResult<Document> {
    let doc_type: String = row.try_get("doc_type")?;
    let status: String = row.try_get("status")?;

    Ok(Document {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        doc_type: DocType::parse(&doc_type)
            .ok_or_else(|| RepositoryError::driver(format!("unknown doc_type '{}'", doc_type)))?,
        status: DocStatus::parse(&status)
            .ok_or_else(|| RepositoryError::driver(format!("unknown status '{}'", status)))?,
        active: row.try_get("active")?,
        url: row.try_get("url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn version_from_row(row: &PgRow) -> RepositoryResult<DocumentVersion> {
    let version: i32 = row.try_get("version")?;
    Ok(DocumentVersion {
        id: row.try_get("id")?,
        document_id: row.try_get("document_id")?,
        version: u32::try_from(version)
            .map_err(|_| RepositoryError::driver(format!("non-positive version {}", version)))?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Escape LIKE metacharacters in a user-supplied substring
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl DocumentRepository for PgRepository {
    async fn create(&self, new_doc: NewDocument) -> RepositoryResult<Document> {
        let now: DateTime<Utc> = Utc::now();
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

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO documents (id, title, doc_type, status, active, url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(document.id)
        .bind(&document.title)
        .bind(document.doc_type.as_str())
        .bind(document.status.as_str())
        .bind(document.active)
        .bind(&document.url)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut *tx)
        .await?;

        // Seed version rides the same transaction as the document row.
        sqlx::query(
            "INSERT INTO document_versions (id, document_id, version, content, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(document.id)
        .bind(1_i32)
        .bind(&document.title)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(document)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = $1 AND status <> $2",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(DocStatus::Deleted.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn search(&self, query: &SearchQuery) -> RepositoryResult<Vec<Document>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM documents WHERE status <> ",
            DOCUMENT_COLUMNS
        ));
        builder.push_bind(DocStatus::Deleted.as_str());

        if let Some(title) = &query.title {
            builder.push(" AND title ILIKE ");
            builder.push_bind(like_pattern(title));
        }
        if let Some(doc_type) = query.doc_type {
            builder.push(" AND doc_type = ");
            builder.push_bind(doc_type.as_str());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(active) = query.active {
            builder.push(" AND active = ");
            builder.push_bind(active);
        }

        builder.push(" ORDER BY created_at, id LIMIT ");
        builder.push_bind(i64::from(query.limit));
        builder.push(" OFFSET ");
        builder.push_bind(query.offset as i64);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(document_from_row).collect()
    }

    async fn add_version(
        &self,
        document_id: Uuid,
        content: &str,
    ) -> RepositoryResult<AddVersionOutcome> {
        let mut tx = self.pool.begin().await?;

        // Bounded lock wait; 55P03 on expiry maps to LockTimeout.
        sqlx::query(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_wait.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT status, active FROM documents WHERE id = $1 FOR UPDATE")
            .bind(document_id)
            .fetch_optional(&mut *tx)
            .await?;

        // Precondition re-check under the lock: the document may have been
        // archived or deleted since the caller's earlier look.
        let Some(row) = row else {
            return Ok(AddVersionOutcome::NotFound);
        };
        let status: String = row.try_get("status")?;
        let active: bool = row.try_get("active")?;
        if status == DocStatus::Deleted.as_str() {
            return Ok(AddVersionOutcome::Deleted);
        }
        if !active {
            return Ok(AddVersionOutcome::Archived);
        }

        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(version) FROM document_versions WHERE document_id = $1")
                .bind(document_id)
                .fetch_one(&mut *tx)
                .await?;
        let next = max.unwrap_or(0) + 1;

        let version = DocumentVersion {
            id: Uuid::new_v4(),
            document_id,
            version: u32::try_from(next)
                .map_err(|_| RepositoryError::driver("version counter overflow"))?,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO document_versions (id, document_id, version, content, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(version.id)
        .bind(version.document_id)
        .bind(next)
        .bind(&version.content)
        .bind(version.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(AddVersionOutcome::Inserted(version))
    }

    async fn archive(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query(&format!(
            "UPDATE documents SET active = false, status = $2, updated_at = $3 \
             WHERE id = $1 AND status <> $4 RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(DocStatus::Draft.as_str())
        .bind(Utc::now())
        .bind(DocStatus::Deleted.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn unarchive(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query(&format!(
            "UPDATE documents SET active = true, status = $2, updated_at = $3 \
             WHERE id = $1 AND status <> $4 RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(DocStatus::Published.as_str())
        .bind(Utc::now())
        .bind(DocStatus::Deleted.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn soft_delete(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query(&format!(
            "UPDATE documents SET active = false, status = $2, updated_at = $3 \
             WHERE id = $1 AND status <> $2 RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(DocStatus::Deleted.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn list_versions(&self, document_id: Uuid) -> RepositoryResult<Vec<DocumentVersion>> {
        let rows = sqlx::query(
            "SELECT id, document_id, version, content, created_at \
             FROM document_versions WHERE document_id = $1 ORDER BY version ASC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(version_from_row).collect()
    }
}
