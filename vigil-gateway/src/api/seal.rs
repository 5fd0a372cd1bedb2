//! Seal endpoint
//!
//! Wraps a posted JSON object in an [`ArtifactEnvelope`]. Non-object bodies
//! are a 400; objects without a usable `artifact_identity.resonance_id` are
//! a 422.

use super::error::ApiResult;
use axum::{Json, extract::rejection::JsonRejection};
use serde_json::Value;
use vigil_core::domain::envelope::{self, ArtifactEnvelope};

/// POST /v1/seal
pub async fn seal_payload(
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ArtifactEnvelope>> {
    let Json(payload) = body?;
    let sealed = envelope::seal_value(payload)?;

    tracing::info!(
        "Sealed artifact {} ({})",
        sealed.artifact_id(),
        sealed.content_hash()
    );

    Ok(Json(sealed))
}
