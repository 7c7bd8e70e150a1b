//! # Cache Keys
//!
//! Deterministic cache keys: `{operation}:{fingerprint}`, where the
//! fingerprint is the JSON serialization of the argument values. Mutations
//! purge by the `{operation}:` prefix, so every read key must start with
//! its operation name.

use serde::Serialize;

/// Operation name for single-document reads
pub const GET_DOCUMENT: &str = "get_document";

/// Operation name for filtered searches
pub const SEARCH_DOCUMENTS: &str = "search_documents";

/// Operation name for version listings
pub const LIST_VERSIONS: &str = "list_versions";

/// Build a read key from an operation name and its argument values
pub fn read_key<A: Serialize>(operation: &str, args: &A) -> String {
    // Serialization of plain argument values cannot realistically fail;
    // an empty fingerprint degrades to a shared per-operation key.
    let fingerprint = serde_json::to_string(args).unwrap_or_default();
    format!("{}:{}", operation, fingerprint)
}

/// Purge prefix for all keys of one operation
pub fn prefix(operation: &str) -> String {
    format!("{}:", operation)
}
