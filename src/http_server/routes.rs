//! Document HTTP Routes
//!
//! REST surface for the document lifecycle. Marshalling only: handlers
//! decode the request, call the service, and encode the result. All
//! validation and state-machine decisions live in the service.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::document::{CreateDocumentRequest, SearchRequest};
use crate::service::DocumentService;

use super::response::{ApiError, MessageResponse};

/// Body for version creation
#[derive(Debug, Deserialize)]
pub struct AddVersionBody {
    pub content: String,
}

/// Build the document router
pub fn document_routes(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route("/documents", post(create_document).get(search_documents))
        .route(
            "/documents/:id",
            get(get_document).delete(soft_delete_document),
        )
        .route(
            "/documents/:id/versions",
            post(add_version).get(list_versions),
        )
        .route("/documents/:id/archive", post(archive_document))
        .route("/documents/:id/unarchive", post(unarchive_document))
        .with_state(service)
}

async fn create_document(
    State(service): State<Arc<DocumentService>>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let document = service.create_document(&request).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn search_documents(
    State(service): State<Arc<DocumentService>>,
    Query(request): Query<SearchRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let documents = service.search_documents(&request).await?;
    Ok(Json(documents))
}

async fn get_document(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let document = service.get_document(&id).await?;
    Ok(Json(document))
}

async fn add_version(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
    Json(body): Json<AddVersionBody>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let version = service.add_version(&id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

async fn list_versions(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let versions = service.list_versions(&id).await?;
    Ok(Json(versions))
}

async fn archive_document(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    service.archive_document(&id).await?;
    Ok(Json(MessageResponse::new("Document archived")))
}

async fn unarchive_document(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    service.unarchive_document(&id).await?;
    Ok(Json(MessageResponse::new("Document unarchived")))
}

async fn soft_delete_document(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    service.soft_delete_document(&id).await?;
    Ok(Json(MessageResponse::new("Document deleted")))
}
