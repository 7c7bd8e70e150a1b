//! # HTTP Boundary
//!
//! REST routes over the document service. This layer only marshals:
//! domain errors map to status codes through their severity class, and no
//! business rule lives here.

pub mod config;
pub mod response;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use response::{ApiError, MessageResponse};
pub use routes::document_routes;
pub use server::HttpServer;
