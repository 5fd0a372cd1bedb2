//! API Module
//!
//! HTTP surface of the gateway. Every response passes through
//! [`stamp_response`], which tags it with a request id and its latency.

pub mod chat;
pub mod error;
pub mod health;
pub mod seal;
pub mod vision;

use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const RESPONSE_TIME_HEADER: &str = "x-response-time-ms";

/// Create the gateway router with all endpoints
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/v1/chat", post(chat::chat))
        .route("/v1/vision", post(vision::describe))
        .route("/v1/seal", post(seal::seal_payload))
        .fallback(error::not_found)
        .layer(middleware::from_fn(stamp_response))
        .layer(TraceLayer::new_for_http())
}

/// Attach `x-request-id` and `x-response-time-ms` to every response
///
/// A caller-supplied request id is echoed back; otherwise a fresh v4 UUID
/// is generated.
pub async fn stamp_response(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|value| !value.is_empty())
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());
    let started = Instant::now();

    let mut response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let headers = response.headers_mut();
    if let Some(id) = request_id {
        headers.insert(REQUEST_ID_HEADER, id);
    }
    headers.insert(RESPONSE_TIME_HEADER, HeaderValue::from(elapsed_ms));

    response
}
