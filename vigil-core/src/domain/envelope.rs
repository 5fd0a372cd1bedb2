//! Sealed artifact envelopes
//!
//! An envelope wraps a JSON payload together with the SHA-256 digest of its
//! canonical form. Envelopes have no mutators: changing the payload means
//! sealing a new envelope, which yields a new hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::hashing::content_hash;

/// Object key holding the identity block inside a payload
pub const IDENTITY_KEY: &str = "artifact_identity";

/// Key inside the identity block naming the artifact
pub const RESONANCE_ID_KEY: &str = "resonance_id";

/// Errors raised while sealing a payload
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SealError {
    /// Payload is valid JSON but not an object
    #[error("Payload must be a JSON object")]
    NotAnObject,

    /// `artifact_identity.resonance_id` is absent
    #[error("Payload is missing required field 'artifact_identity.resonance_id'")]
    MissingIdentity,

    /// `artifact_identity.resonance_id` is present but not a string
    #[error("Field 'artifact_identity.resonance_id' must be a string")]
    InvalidIdentity,
}

/// Immutable, hash-sealed wrapper around a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    artifact_id: String,
    content_hash: String,
    timestamp: DateTime<Utc>,
    payload: Map<String, Value>,
}

impl ArtifactEnvelope {
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Lowercase hex SHA-256 of the canonical payload
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Recompute the payload digest and compare it with the stored one
    ///
    /// Only meaningful for envelopes read back from storage; a freshly
    /// sealed envelope always verifies.
    pub fn verify(&self) -> bool {
        content_hash(&Value::Object(self.payload.clone())) == self.content_hash
    }
}

/// Seal a payload object into an envelope stamped with the current time
pub fn seal(payload: Map<String, Value>) -> Result<ArtifactEnvelope, SealError> {
    seal_at(payload, Utc::now())
}

/// Seal an arbitrary JSON value, rejecting anything that is not an object
pub fn seal_value(payload: Value) -> Result<ArtifactEnvelope, SealError> {
    match payload {
        Value::Object(map) => seal(map),
        _ => Err(SealError::NotAnObject),
    }
}

/// Seal with an explicit timestamp
pub fn seal_at(
    payload: Map<String, Value>,
    timestamp: DateTime<Utc>,
) -> Result<ArtifactEnvelope, SealError> {
    let artifact_id = match payload
        .get(IDENTITY_KEY)
        .and_then(|identity| identity.get(RESONANCE_ID_KEY))
    {
        Some(Value::String(id)) => id.clone(),
        Some(_) => return Err(SealError::InvalidIdentity),
        None => return Err(SealError::MissingIdentity),
    };

    let content_hash = content_hash(&Value::Object(payload.clone()));

    Ok(ArtifactEnvelope {
        artifact_id,
        content_hash,
        timestamp,
        payload,
    })
}
