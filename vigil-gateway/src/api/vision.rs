use super::error::{ApiError, ApiResult};
use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct VisionRequest {
    pub image_url: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisionResponse {
    pub description: String,
    pub image_url: String,
}

/// POST /v1/vision
/// Returns a templated description; the image is never fetched.
pub async fn describe(
    body: Result<Json<VisionRequest>, JsonRejection>,
) -> ApiResult<Json<VisionResponse>> {
    let Json(req) = body?;
    let image_url = req.image_url.trim();
    if image_url.is_empty() {
        return Err(ApiError::BadRequest(
            "image_url must not be empty".to_string(),
        ));
    }

    let description = match req.prompt.as_deref().map(str::trim) {
        Some(prompt) if !prompt.is_empty() => {
            format!("Image at {} received with prompt: {}", image_url, prompt)
        }
        _ => format!("Image at {} received", image_url),
    };

    Ok(Json(VisionResponse {
        description,
        image_url: image_url.to_string(),
    }))
}
