//! Batch-related API endpoints

use tracing::debug;
use vigil_core::domain::job::{JobName, JobSnapshot};
use vigil_core::dto::batch::{BatchResponse, CreateBatchRequest, CreatedBatch};

use crate::BatchClient;
use crate::error::{ClientError, Result};

impl BatchClient {
    // =============================================================================
    // Batch Lifecycle
    // =============================================================================

    /// Create a new batch job from inlined requests
    ///
    /// # Arguments
    /// * `model` - Model name, with or without the `models/` prefix
    /// * `req` - The batch creation request
    ///
    /// # Returns
    /// The handle of the created batch
    pub async fn create_batch(&self, model: &str, req: &CreateBatchRequest) -> Result<CreatedBatch> {
        if req.batch.input_config.requests.requests.is_empty() {
            return Err(ClientError::InvalidRequest(
                "a batch needs at least one request".to_string(),
            ));
        }

        let url = self.create_url(model)?;
        debug!("Creating batch at {}", url);

        let response = self
            .client
            .post(&url)
            .header(crate::API_KEY_HEADER, &self.api_key)
            .json(req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current status of a batch
    ///
    /// # Arguments
    /// * `name` - The batch name (e.g. `batches/abc123`)
    ///
    /// # Returns
    /// The normalized status snapshot
    pub async fn get_batch(&self, name: &JobName) -> Result<JobSnapshot> {
        let url = self.batch_url(name);
        debug!("Fetching batch status from {}", url);

        let response = self
            .client
            .get(&url)
            .header(crate::API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let raw: BatchResponse = self.handle_response(response).await?;
        Ok(raw.into())
    }

    // =============================================================================
    // URL Builders
    // =============================================================================

    pub(crate) fn batch_url(&self, name: &JobName) -> String {
        format!("{}/{}", self.base_url, name.as_str().trim_start_matches('/'))
    }

    pub(crate) fn create_url(&self, model: &str) -> Result<String> {
        let model = model.trim();
        let model = model.strip_prefix("models/").unwrap_or(model);
        if model.is_empty() {
            return Err(ClientError::InvalidRequest(
                "model name cannot be empty".to_string(),
            ));
        }

        Ok(format!(
            "{}/models/{}:batchGenerateContent",
            self.base_url, model
        ))
    }
}
