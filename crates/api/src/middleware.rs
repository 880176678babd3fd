use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id attached to every request's extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Tag each request with an id, echo it back, and log the outcome.
pub async fn request_log(mut req: Request, next: Next) -> Response {
    let id = RequestId(Uuid::now_v7());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(id);

    let started = Instant::now();
    let mut res = next.run(req).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    if let Ok(value) = HeaderValue::from_str(&id.0.to_string()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = res.status().as_u16();
    if res.status().is_server_error() {
        tracing::error!(request_id = %id.0, %method, %path, status, latency_ms, "request failed");
    } else {
        tracing::info!(request_id = %id.0, %method, %path, status, latency_ms, "request handled");
    }

    res
}
