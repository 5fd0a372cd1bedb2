//! Vigil HTTP Client
//!
//! A small, type-safe client for the hosted generative-AI batch API.
//!
//! The client exposes exactly the three operations the rest of Vigil relies
//! on: create a batch, fetch its status, and download an output file. Status
//! responses are normalized into [`JobSnapshot`] here, so callers never see
//! the different wire layouts the service has used.
//!
//! # Example
//!
//! ```no_run
//! use vigil_client::{BatchApi, BatchClient};
//! use vigil_core::domain::job::JobName;
//!
//! #[tokio::main]
//! async fn main() -> vigil_client::Result<()> {
//!     let client = BatchClient::new("my-api-key");
//!     let name = JobName::new("batches/abc123").expect("non-empty");
//!
//!     let snapshot = client.get_batch(&name).await?;
//!     println!("{} is {}", snapshot.name, snapshot.state);
//!     Ok(())
//! }
//! ```

pub mod error;
mod batches;
mod files;

// Re-export commonly used types
pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use vigil_core::domain::job::{JobName, JobSnapshot, OutputRef};
use vigil_core::dto::batch::{CreateBatchRequest, CreatedBatch};

/// Default base URL of the batch API
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default base URL for media downloads
pub const DEFAULT_DOWNLOAD_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/download/v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Operations of the remote batch service Vigil depends on
///
/// Implemented by [`BatchClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait BatchApi: Send + Sync {
    /// Create a batch job for `model` and return its handle
    async fn create_batch(&self, model: &str, req: &CreateBatchRequest) -> Result<CreatedBatch>;

    /// Fetch the current status of a batch job
    async fn get_batch(&self, name: &JobName) -> Result<JobSnapshot>;

    /// Download the raw bytes of an output file
    async fn download_file(&self, output: &OutputRef) -> Result<Vec<u8>>;
}

/// HTTP client for the batch API
#[derive(Debug, Clone)]
pub struct BatchClient {
    /// Base URL for JSON endpoints
    base_url: String,
    /// Base URL for media downloads
    download_base_url: String,
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl BatchClient {
    /// Create a client against the default public endpoints
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_urls(api_key, DEFAULT_API_BASE_URL, DEFAULT_DOWNLOAD_BASE_URL)
    }

    /// Create a client against custom endpoints (proxies, test servers)
    pub fn with_base_urls(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        download_base_url: impl Into<String>,
    ) -> Self {
        Self::with_client(api_key, base_url, download_base_url, Client::new())
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        download_base_url: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            download_base_url: download_base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the JSON API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the base URL used for downloads
    pub fn download_base_url(&self) -> &str {
        &self.download_base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is raw bytes
    async fn handle_bytes_response(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let response = self.check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl BatchApi for BatchClient {
    async fn create_batch(&self, model: &str, req: &CreateBatchRequest) -> Result<CreatedBatch> {
        BatchClient::create_batch(self, model, req).await
    }

    async fn get_batch(&self, name: &JobName) -> Result<JobSnapshot> {
        BatchClient::get_batch(self, name).await
    }

    async fn download_file(&self, output: &OutputRef) -> Result<Vec<u8>> {
        BatchClient::download_file(self, output).await
    }
}
