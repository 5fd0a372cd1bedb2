//! Chat endpoint
//!
//! Echoes the message back. No model is called.

use super::error::{ApiError, ApiResult};
use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

pub const ECHO_MODEL: &str = "vigil-echo";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}

/// POST /v1/chat
pub async fn chat(
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(req) = body?;
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    Ok(Json(ChatResponse {
        reply: format!("Echo: {}", message),
        model: ECHO_MODEL.to_string(),
    }))
}
