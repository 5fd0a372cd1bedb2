//! Batch DTOs exchanged with the remote service

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::job::{JobSnapshot, JobState, OutputRef};

// =============================================================================
// Status responses
// =============================================================================

/// A batch status response in any of the layouts the service returns
///
/// Variants are tried in order; the first one whose required fields are all
/// present wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BatchResponse {
    /// Results listed as `output_files[0].name`
    V1(OutputFilesBatch),
    /// Results referenced through `dest.file_name`
    V2(DestinationBatch),
    /// Long-running operation form with state under `metadata`
    Operation(BatchOperation),
    /// No result reference yet (job still running, or failed)
    StateOnly(StateOnlyBatch),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputFilesBatch {
    pub name: String,
    pub state: String,
    #[serde(alias = "outputFiles")]
    pub output_files: Vec<FileRef>,
    /// Consulted only when `output_files` names nothing
    #[serde(default)]
    pub dest: Option<Destination>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationBatch {
    pub name: String,
    pub state: String,
    pub dest: Destination,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Destination {
    #[serde(default, alias = "fileName")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchOperation {
    pub name: String,
    pub metadata: OperationMetadata,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationMetadata {
    pub state: String,
    #[serde(default)]
    pub output: Option<OperationOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationOutput {
    #[serde(default, alias = "responsesFile")]
    pub responses_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateOnlyBatch {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// Error detail attached to a failed job: a bare string or a status object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Status {
        #[serde(default)]
        code: Option<i64>,
        #[serde(default)]
        message: String,
    },
}

impl ErrorDetail {
    pub fn into_message(self) -> String {
        match self {
            ErrorDetail::Message(message) => message,
            ErrorDetail::Status {
                code: Some(code),
                message,
            } => format!("{} (code {})", message, code),
            ErrorDetail::Status {
                code: None,
                message,
            } => message,
        }
    }
}

impl From<BatchResponse> for JobSnapshot {
    fn from(response: BatchResponse) -> Self {
        let (name, raw_state, output, error) = match response {
            BatchResponse::V1(batch) => {
                let output = batch
                    .output_files
                    .into_iter()
                    .find_map(|file| OutputRef::new(file.name))
                    .or_else(|| {
                        batch
                            .dest
                            .and_then(|dest| dest.file_name)
                            .and_then(OutputRef::new)
                    });
                (batch.name, batch.state, output, batch.error)
            }
            BatchResponse::V2(batch) => {
                let output = batch.dest.file_name.and_then(OutputRef::new);
                (batch.name, batch.state, output, batch.error)
            }
            BatchResponse::Operation(op) => {
                let output = op
                    .metadata
                    .output
                    .and_then(|output| output.responses_file)
                    .and_then(OutputRef::new);
                (op.name, op.metadata.state, output, op.error)
            }
            BatchResponse::StateOnly(batch) => (batch.name, batch.state, None, batch.error),
        };

        JobSnapshot {
            name,
            state: JobState::from_remote(&raw_state),
            raw_state,
            output,
            error: error.map(ErrorDetail::into_message).filter(|m| !m.is_empty()),
        }
    }
}

// =============================================================================
// Job creation
// =============================================================================

/// Request body for creating a batch from inlined requests
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub batch: BatchSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSpec {
    pub display_name: String,
    pub input_config: InputConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    pub requests: InlinedRequests,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinedRequests {
    pub requests: Vec<InlinedRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinedRequest {
    pub request: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl InlinedRequest {
    /// Wrap a request entry
    ///
    /// Entries already shaped as `{ "request": ..., "metadata"?: ... }` (or
    /// the JSONL form with `key`) are kept; anything else is taken to be a
    /// bare generate-content request.
    pub fn from_entry(entry: Value) -> Self {
        match entry {
            Value::Object(mut map) if map.contains_key("request") => {
                let request = map.remove("request").unwrap_or(Value::Null);
                let metadata = map
                    .remove("metadata")
                    .or_else(|| map.remove("key").map(|key| serde_json::json!({ "key": key })));
                Self { request, metadata }
            }
            other => Self {
                request: other,
                metadata: None,
            },
        }
    }
}

impl CreateBatchRequest {
    pub fn new(display_name: impl Into<String>, entries: Vec<Value>) -> Self {
        Self {
            batch: BatchSpec {
                display_name: display_name.into(),
                input_config: InputConfig {
                    requests: InlinedRequests {
                        requests: entries.into_iter().map(InlinedRequest::from_entry).collect(),
                    },
                },
            },
        }
    }
}

/// Handle returned by the create call
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedBatch {
    pub name: String,
}

/// Parse a requests file: a JSON array, or one JSON document per line
pub fn parse_request_entries(text: &str) -> Result<Vec<Value>, serde_json::Error> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text);
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect()
}
