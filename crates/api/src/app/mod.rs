//! HTTP API application wiring (Axum router + shared prediction service).
//!
//! - `routes/`: HTTP routes + handlers (system probes, predictions)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use bankmark_ai::PredictionService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The service is loaded (or failed) before this is called and is only read
/// afterwards.
pub fn build_app(service: Arc<PredictionService>) -> Router {
    routes::router()
        .layer(Extension(service))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_log)))
}
