//! Job domain types

use serde::{Deserialize, Serialize};

/// Opaque name of a remote batch job (e.g. `batches/abc123`)
///
/// The only guarantee is that the name is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    /// Build a job name from raw input, returning `None` if it trims to nothing
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Batch job execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Expired,
    /// State could not be fetched or was not recognised
    Unknown,
}

impl JobState {
    /// Parse a state string as reported by the remote service
    ///
    /// Accepts the SDK form (`JOB_STATE_SUCCEEDED`), the REST form
    /// (`BATCH_STATE_SUCCEEDED`) and bare lowercase names (`succeeded`).
    pub fn from_remote(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        let bare = upper
            .strip_prefix("JOB_STATE_")
            .or_else(|| upper.strip_prefix("BATCH_STATE_"))
            .unwrap_or(upper.as_str());

        match bare {
            "PENDING" | "QUEUED" | "CREATING" => JobState::Pending,
            "RUNNING" | "ACTIVE" | "CANCELLING" | "PAUSED" => JobState::Running,
            "SUCCEEDED" | "SUCCESS" => JobState::Succeeded,
            "FAILED" => JobState::Failed,
            "CANCELLED" | "CANCELED" => JobState::Cancelled,
            "EXPIRED" => JobState::Expired,
            _ => JobState::Unknown,
        }
    }

    /// Whether no further transition can happen from this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled | JobState::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
            JobState::Expired => "EXPIRED",
            JobState::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a remote output file (e.g. `files/batch-abc`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRef(String);

impl OutputRef {
    /// Returns `None` for blank references
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Point-in-time view of a remote job
///
/// Fetched fresh on every poll and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub name: String,
    pub state: JobState,
    /// State string exactly as the service reported it
    pub raw_state: String,
    pub output: Option<OutputRef>,
    pub error: Option<String>,
}

impl JobSnapshot {
    /// Snapshot used when the remote status could not be fetched
    pub fn unknown(name: &JobName) -> Self {
        Self {
            name: name.to_string(),
            state: JobState::Unknown,
            raw_state: JobState::Unknown.as_str().to_string(),
            output: None,
            error: None,
        }
    }
}
