use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use bankmark_ai::PredictionService;

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Bank Marketing Prediction API",
        "status": "running",
    }))
}

/// 200 once the pipeline is loaded, 503 otherwise.
pub async fn health(Extension(service): Extension<Arc<PredictionService>>) -> impl IntoResponse {
    let (status, label) = if service.is_ready() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(serde_json::json!({
            "status": label,
            "pipeline": service.status(),
        })),
    )
}
