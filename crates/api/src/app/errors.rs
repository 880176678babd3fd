use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bankmark_ai::ServingError;
use bankmark_core::ValidationError;

pub fn serving_error_to_response(err: ServingError) -> axum::response::Response {
    let code = err.code();
    match &err {
        ServingError::Validation(v) => validation_error(v),
        ServingError::ServiceUnavailable { .. } | ServingError::PipelineLoad { .. } => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, code, err.to_string())
        }
        ServingError::PipelineInference { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
        }
    }
}

/// 422 naming every offending field (and the row, for batches).
pub fn validation_error(err: &ValidationError) -> axum::response::Response {
    let row = match err {
        ValidationError::Row { row, .. } => Some(*row),
        _ => None,
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        axum::Json(json!({
            "error": "validation_error",
            "message": err.to_string(),
            "fields": err.offending_fields(),
            "row": row,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
