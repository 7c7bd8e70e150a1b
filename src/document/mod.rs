//! # Document Domain
//!
//! Plain data records, the domain error taxonomy, and input validation for
//! the document lifecycle engine.
//!
//! Lifecycle states per document:
//! - `Published` + active = live
//! - `Draft` + inactive = archived
//! - `Deleted` = terminal

pub mod errors;
pub mod types;
pub mod validate;

pub use errors::{DocumentError, DocumentResult, Severity};
pub use types::{
    CreateDocumentRequest, DocStatus, DocType, Document, DocumentVersion, NewDocument,
    SearchQuery, SearchRequest,
};
