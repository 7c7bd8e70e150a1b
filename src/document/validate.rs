//! Input Validation
//!
//! Validation runs before any store call and never produces partial
//! mutations. Bounds follow the public API contract: titles up to 200
//! characters, content up to 50,000, search pages capped at 100.

use uuid::Uuid;

use super::errors::{DocumentError, DocumentResult};
use super::types::{
    CreateDocumentRequest, DocStatus, DocType, NewDocument, SearchQuery, SearchRequest,
};

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum version content length in characters
pub const MAX_CONTENT_LEN: usize = 50_000;

/// Maximum title-substring query length
pub const MAX_QUERY_LEN: usize = 100;

/// Maximum search page size
pub const MAX_LIMIT: u32 = 100;

/// Default search page size
pub const DEFAULT_LIMIT: u32 = 10;

/// Validate a document id string
pub fn document_id(raw: &str) -> DocumentResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| DocumentError::invalid_input("invalid document id format"))
}

/// Validate a creation request into a `NewDocument`
pub fn create(request: &CreateDocumentRequest) -> DocumentResult<NewDocument> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(DocumentError::invalid_input("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DocumentError::invalid_input(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }

    let doc_type = DocType::parse(&request.doc_type).ok_or_else(|| {
        DocumentError::invalid_input(format!(
            "invalid document type '{}'; valid types are PDF, JPG, PNG, TXT",
            request.doc_type
        ))
    })?;

    let url = url(&request.url, doc_type)?;

    Ok(NewDocument {
        title: title.to_string(),
        doc_type,
        url,
    })
}

/// Validate a source URL against the declared document type
///
/// The URL's extension must match the type; a PNG document pointing at a
/// `.pdf` URL is rejected before any store call.
pub fn url(raw: &str, doc_type: DocType) -> DocumentResult<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(DocumentError::invalid_input("url is required"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(DocumentError::invalid_input(
            "url must start with http:// or https://",
        ));
    }

    // Extension check on the path, ignoring query and fragment.
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    let matches = match doc_type {
        // JPG accepts the common .jpeg spelling as well
        DocType::Jpg => path.ends_with(".jpg") || path.ends_with(".jpeg"),
        other => path.ends_with(&format!(".{}", other.extension())),
    };
    if !matches {
        return Err(DocumentError::invalid_input(format!(
            "url does not match document type {}",
            doc_type
        )));
    }

    Ok(url.to_string())
}

/// Validate version content
pub fn content(raw: &str) -> DocumentResult<&str> {
    if raw.is_empty() {
        return Err(DocumentError::invalid_input("content cannot be empty"));
    }
    if raw.chars().count() > MAX_CONTENT_LEN {
        return Err(DocumentError::invalid_input(format!(
            "content is too large (max {} characters)",
            MAX_CONTENT_LEN
        )));
    }
    Ok(raw)
}

/// Validate a search request into a `SearchQuery`
///
/// An explicit `status=DELETED` filter is rejected: deleted documents are
/// excluded from search unconditionally.
pub fn search(request: &SearchRequest) -> DocumentResult<SearchQuery> {
    let title = match &request.query {
        Some(q) => {
            let q = q.trim();
            if q.chars().count() > MAX_QUERY_LEN {
                return Err(DocumentError::invalid_input(format!(
                    "query must be at most {} characters",
                    MAX_QUERY_LEN
                )));
            }
            if q.is_empty() {
                None
            } else {
                Some(q.to_string())
            }
        }
        None => None,
    };

    let doc_type = match &request.doc_type {
        Some(t) => Some(DocType::parse(t).ok_or_else(|| {
            DocumentError::invalid_input(format!(
                "invalid document type '{}'; valid types are PDF, JPG, PNG, TXT",
                t
            ))
        })?),
        None => None,
    };

    let status = match &request.status {
        Some(s) => Some(DocStatus::parse(s).ok_or_else(|| {
            DocumentError::invalid_input(format!("invalid document status '{}'", s))
        })?),
        None => None,
    };
    if status == Some(DocStatus::Deleted) {
        return Err(DocumentError::Deleted);
    }

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(DocumentError::invalid_input(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    Ok(SearchQuery {
        title,
        doc_type,
        status,
        active: request.active,
        limit,
        offset: request.offset.unwrap_or(0),
    })
}
