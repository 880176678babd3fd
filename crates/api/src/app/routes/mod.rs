use axum::{
    routing::{get, post},
    Router,
};

pub mod predictions;
pub mod system;

/// Router for every endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/predict", post(predictions::predict))
        .route("/predict/batch", post(predictions::predict_batch))
}
