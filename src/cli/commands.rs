//! CLI command implementations
//!
//! `serve` is the composition root: it wires repository → cache → service
//! → broker → dispatcher in one visible place and then hands the router to
//! the HTTP server.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::MemoryCache;
use crate::events::{ChannelBroker, EventDispatcher, EventPublisher, Topic};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::Logger;
use crate::processing::{DocumentSink, VersionSink};
use crate::repository::{DocumentRepository, MemoryRepository, PgRepository};
use crate::service::{CacheTtls, DocumentService};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Postgres connection URL; omitted = in-memory store (dev mode)
    #[serde(default)]
    pub database_url: Option<String>,

    /// Row-lock wait budget in milliseconds
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

fn default_lock_wait_ms() -> u64 {
    5_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

/// Cache TTL configuration, seconds per read operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_document_ttl")]
    pub document_ttl_secs: u64,
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    #[serde(default = "default_versions_ttl")]
    pub versions_ttl_secs: u64,
}

fn default_document_ttl() -> u64 {
    300
}
fn default_search_ttl() -> u64 {
    120
}
fn default_versions_ttl() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            document_ttl_secs: default_document_ttl(),
            search_ttl_secs: default_search_ttl(),
            versions_ttl_secs: default_versions_ttl(),
        }
    }
}

impl CacheConfig {
    fn to_ttls(&self) -> CacheTtls {
        CacheTtls {
            document: Duration::from_secs(self.document_ttl_secs),
            search: Duration::from_secs(self.search_ttl_secs),
            versions: Duration::from_secs(self.versions_ttl_secs),
        }
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Per-message processing timeout in milliseconds
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

fn default_message_timeout_ms() -> u64 {
    30_000
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            message_timeout_ms: default_message_timeout_ms(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Directory for processor spool files
    #[serde(default = "default_spool_dir")]
    pub spool_dir: String,
}

fn default_spool_dir() -> String {
    "./spool".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            dispatcher: DispatcherConfig::default(),
            spool_dir: default_spool_dir(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("failed to read {}: {}", path.display(), e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config(format!("invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> CliResult<()> {
        if self.cache.document_ttl_secs == 0
            || self.cache.search_ttl_secs == 0
            || self.cache.versions_ttl_secs == 0
        {
            return Err(CliError::config("cache TTLs must be > 0"));
        }
        if self.dispatcher.message_timeout_ms == 0 {
            return Err(CliError::config("dispatcher.message_timeout_ms must be > 0"));
        }
        if self.store.lock_wait_ms == 0 {
            return Err(CliError::config("store.lock_wait_ms must be > 0"));
        }
        if self.spool_dir.trim().is_empty() {
            return Err(CliError::config("spool_dir must not be empty"));
        }
        Ok(())
    }
}

/// Entry point called from main
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
    }
}

/// Write a default configuration file
pub fn init(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = Config::default();
    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| CliError::config(format!("failed to encode config: {}", e)))?;
    fs::write(path, content)?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Boot the full engine and serve until stopped
pub fn serve(path: &Path) -> CliResult<()> {
    let config = Config::load(path)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot(format!("tokio runtime: {}", e)))?;
    runtime.block_on(serve_inner(config))
}

async fn serve_inner(config: Config) -> CliResult<()> {
    // Store of record.
    let repo: Arc<dyn DocumentRepository> = match &config.store.database_url {
        Some(url) => {
            let pg = PgRepository::connect(url)
                .await
                .map_err(|e| CliError::boot(format!("postgres connect: {}", e)))?
                .with_lock_wait(Duration::from_millis(config.store.lock_wait_ms));
            pg.ensure_schema()
                .await
                .map_err(|e| CliError::boot(format!("schema bootstrap: {}", e)))?;
            Logger::info("STORE_READY", &[("backend", "postgres".to_string())]);
            Arc::new(pg)
        }
        None => {
            Logger::info("STORE_READY", &[("backend", "memory".to_string())]);
            Arc::new(MemoryRepository::new())
        }
    };

    let broker = Arc::new(ChannelBroker::new());

    // Downstream consumption group: one processor per lifecycle topic.
    // The dispatcher subscribes before the server accepts traffic so no
    // early mutation publishes into the void.
    let spool = &config.spool_dir;
    let mut dispatcher = EventDispatcher::new()
        .with_message_timeout(Duration::from_millis(config.dispatcher.message_timeout_ms));
    dispatcher.register(
        Topic::DocumentCreated,
        Arc::new(DocumentSink::new("created_sink", spool, "created")),
    );
    dispatcher.register(
        Topic::DocumentArchived,
        Arc::new(DocumentSink::new("archived_sink", spool, "archived")),
    );
    dispatcher.register(
        Topic::DocumentUnarchived,
        Arc::new(DocumentSink::new("unarchived_sink", spool, "unarchived")),
    );
    dispatcher.register(
        Topic::DocumentDeleted,
        Arc::new(DocumentSink::new("deleted_sink", spool, "deleted")),
    );
    dispatcher.register(Topic::VersionAdded, Arc::new(VersionSink::new(spool)));
    let _consumer = dispatcher.spawn(broker.as_ref());

    let service = Arc::new(DocumentService::new(
        repo,
        Arc::new(MemoryCache::new()),
        config.cache.to_ttls(),
        EventPublisher::new(broker),
    ));

    HttpServer::new(config.http.clone(), service)
        .start()
        .await
        .map_err(|e| CliError::boot(format!("http server: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cache.document_ttl_secs, 300);
        assert_eq!(config.cache.search_ttl_secs, 120);
        assert_eq!(config.dispatcher.message_timeout_ms, 30_000);
        assert_eq!(config.store.lock_wait_ms, 5_000);
        assert!(config.store.database_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_ttl() {
        let config: Config =
            serde_json::from_str(r#"{"cache": {"document_ttl_secs": 0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vellum.json");

        init(&path).unwrap();
        assert!(path.exists());
        assert!(init(&path).is_err());
    }

    #[test]
    fn test_load_roundtrips_written_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vellum.json");

        init(&path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.spool_dir, "./spool");
    }
}
