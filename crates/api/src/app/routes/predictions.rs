use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bankmark_ai::PredictionService;
use bankmark_core::FeatureRecord;

use crate::app::{dto, errors};

pub async fn predict(
    Extension(service): Extension<Arc<PredictionService>>,
    body: Result<Json<FeatureRecord>, JsonRejection>,
) -> axum::response::Response {
    let record = match body {
        Ok(Json(record)) => record,
        Err(rejection) => return bad_body(rejection),
    };

    let outcome = tokio::task::spawn_blocking(move || service.predict(&record)).await;

    match outcome {
        Ok(Ok(result)) => Json(result).into_response(),
        Ok(Err(e)) => errors::serving_error_to_response(e),
        Err(join) => worker_failed(join),
    }
}

pub async fn predict_batch(
    Extension(service): Extension<Arc<PredictionService>>,
    body: Result<Json<dto::BatchPredictionRequest>, JsonRejection>,
) -> axum::response::Response {
    let table = match body {
        Ok(Json(req)) => req.records,
        Err(rejection) => return bad_body(rejection),
    };

    let outcome = tokio::task::spawn_blocking(move || {
        service
            .predict_batch(&table)
            .map(|batch| dto::BatchPredictionResponse::new(table, batch))
    })
    .await;

    match outcome {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => errors::serving_error_to_response(e),
        Err(join) => worker_failed(join),
    }
}

fn bad_body(rejection: JsonRejection) -> axum::response::Response {
    tracing::warn!(error = %rejection.body_text(), "rejected request body");
    errors::json_error(rejection.status(), "invalid_body", rejection.body_text())
}

fn worker_failed(err: tokio::task::JoinError) -> axum::response::Response {
    tracing::error!(error = %err, "prediction worker did not complete");
    errors::json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "inference_error",
        "prediction worker did not complete",
    )
}
