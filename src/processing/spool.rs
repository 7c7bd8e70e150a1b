//! # Spool Processors
//!
//! Append-only JSONL sinks for lifecycle entities. Each processor
//! validates the entity shape it consumes, then appends one line per
//! message to its spool file so downstream tooling (thumbnailers,
//! auditors, indexers) can pick the entities up out of band.
//!
//! Duplicate deliveries produce duplicate lines; consumers of the spool
//! must dedupe by entity id, matching at-least-once semantics upstream.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Value};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use async_trait::async_trait;

use crate::document::{Document, DocumentVersion};

use super::{Processor, ProcessingError, ProcessingResult};

async fn append_line(path: &Path, line: String) -> ProcessingResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

/// Spools full document states for one lifecycle topic
pub struct DocumentSink {
    name: &'static str,
    path: PathBuf,
    // Serializes appends so interleaved lines stay intact.
    write_guard: Mutex<()>,
}

impl DocumentSink {
    /// Create a sink writing `<spool_dir>/<file_stem>.jsonl`
    pub fn new(name: &'static str, spool_dir: impl AsRef<Path>, file_stem: &str) -> Self {
        Self {
            name,
            path: spool_dir.as_ref().join(format!("{}.jsonl", file_stem)),
            write_guard: Mutex::new(()),
        }
    }

    /// Spool file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Processor for DocumentSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn process(&self, entity: Value) -> ProcessingResult<()> {
        let document: Document = serde_json::from_value(entity)
            .map_err(|e| ProcessingError::malformed(e.to_string()))?;

        let line = json!({
            "received_at": Utc::now(),
            "document": document,
        })
        .to_string();

        let _guard = self.write_guard.lock().await;
        append_line(&self.path, line).await
    }
}

/// Spools document versions from `version.added`
pub struct VersionSink {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl VersionSink {
    /// Create a sink writing `<spool_dir>/versions.jsonl`
    pub fn new(spool_dir: impl AsRef<Path>) -> Self {
        Self {
            path: spool_dir.as_ref().join("versions.jsonl"),
            write_guard: Mutex::new(()),
        }
    }

    /// Spool file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Processor for VersionSink {
    fn name(&self) -> &'static str {
        "version_sink"
    }

    async fn process(&self, entity: Value) -> ProcessingResult<()> {
        let version: DocumentVersion = serde_json::from_value(entity)
            .map_err(|e| ProcessingError::malformed(e.to_string()))?;

        let line = json!({
            "received_at": Utc::now(),
            "document_id": version.document_id,
            "version": version.version,
            "content_chars": version.content.chars().count(),
        })
        .to_string();

        let _guard = self.write_guard.lock().await;
        append_line(&self.path, line).await
    }
}
