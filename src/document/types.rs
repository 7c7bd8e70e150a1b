//! Document Domain Model
//!
//! Plain data records for documents and their immutable content versions.
//! Lifecycle fields are only mutated through the document service; relational
//! mapping lives entirely behind the repository trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocType {
    Pdf,
    Jpg,
    Png,
    Txt,
}

impl DocType {
    /// All known types, in declaration order
    pub const ALL: [DocType; 4] = [DocType::Pdf, DocType::Jpg, DocType::Png, DocType::Txt];

    /// Returns the canonical uppercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Pdf => "PDF",
            DocType::Jpg => "JPG",
            DocType::Png => "PNG",
            DocType::Txt => "TXT",
        }
    }

    /// File extension associated with this type
    pub fn extension(&self) -> &'static str {
        match self {
            DocType::Pdf => "pdf",
            DocType::Jpg => "jpg",
            DocType::Png => "png",
            DocType::Txt => "txt",
        }
    }

    /// Parse a type name, case-insensitively
    pub fn parse(s: &str) -> Option<DocType> {
        match s.to_ascii_uppercase().as_str() {
            "PDF" => Some(DocType::Pdf),
            "JPG" => Some(DocType::Jpg),
            "PNG" => Some(DocType::Png),
            "TXT" => Some(DocType::Txt),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocStatus {
    Draft,
    Published,
    Deleted,
}

impl DocStatus {
    /// Returns the canonical uppercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Draft => "DRAFT",
            DocStatus::Published => "PUBLISHED",
            DocStatus::Deleted => "DELETED",
        }
    }

    /// Parse a status name, case-insensitively
    pub fn parse(s: &str) -> Option<DocStatus> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(DocStatus::Draft),
            "PUBLISHED" => Some(DocStatus::Published),
            "DELETED" => Some(DocStatus::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A managed document
///
/// The (status, active) pair is the lifecycle state:
/// - `Published` + `active` = live
/// - `Draft` + `!active` = archived
/// - `Deleted` = terminal; excluded from all lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub status: DocStatus,
    pub active: bool,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Terminal state: no further mutation is accepted
    pub fn is_deleted(&self) -> bool {
        self.status == DocStatus::Deleted
    }

    /// Archived: draft and inactive
    pub fn is_archived(&self) -> bool {
        !self.active && self.status == DocStatus::Draft
    }

    /// Live: published and active
    pub fn is_live(&self) -> bool {
        self.active && self.status == DocStatus::Published
    }
}

/// An immutable content version of a document
///
/// For a fixed document, version numbers form a gap-free sequence starting
/// at 1. Versions are never updated or deleted once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: Uuid,
    pub document_id: Uuid,
    pub version: u32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for document creation
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub doc_type: DocType,
    pub url: String,
}

/// Validated search filters, AND-combined
///
/// `Deleted` documents are always excluded regardless of the filters.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub doc_type: Option<DocType>,
    pub status: Option<DocStatus>,
    pub active: Option<bool>,
    pub limit: u32,
    pub offset: u64,
}

/// Raw (unvalidated) document creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub url: String,
}

/// Raw (unvalidated) search request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub status: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_parse_case_insensitive() {
        assert_eq!(DocType::parse("pdf"), Some(DocType::Pdf));
        assert_eq!(DocType::parse("PDF"), Some(DocType::Pdf));
        assert_eq!(DocType::parse("Jpg"), Some(DocType::Jpg));
        assert_eq!(DocType::parse("gif"), None);
    }

    #[test]
    fn test_doc_status_parse() {
        assert_eq!(DocStatus::parse("published"), Some(DocStatus::Published));
        assert_eq!(DocStatus::parse("DELETED"), Some(DocStatus::Deleted));
        assert_eq!(DocStatus::parse("archived"), None);
    }

    #[test]
    fn test_doc_type_serde_uppercase() {
        let json = serde_json::to_string(&DocType::Pdf).unwrap();
        assert_eq!(json, "\"PDF\"");

        let parsed: DocType = serde_json::from_str("\"TXT\"").unwrap();
        assert_eq!(parsed, DocType::Txt);
    }

    #[test]
    fn test_document_wire_format_uses_type_key() {
        let doc = Document {
            id: Uuid::new_v4(),
            title: "report".to_string(),
            doc_type: DocType::Pdf,
            status: DocStatus::Published,
            active: true,
            url: "https://example.com/report.pdf".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], "PDF");
        assert_eq!(value["status"], "PUBLISHED");
        assert_eq!(value["active"], true);
    }

    #[test]
    fn test_lifecycle_state_helpers() {
        let mut doc = Document {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            doc_type: DocType::Txt,
            status: DocStatus::Published,
            active: true,
            url: "https://example.com/t.txt".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(doc.is_live());
        assert!(!doc.is_archived());

        doc.status = DocStatus::Draft;
        doc.active = false;
        assert!(doc.is_archived());
        assert!(!doc.is_live());

        doc.status = DocStatus::Deleted;
        assert!(doc.is_deleted());
        assert!(!doc.is_archived());
    }
}
