//! File download endpoint

use tracing::debug;
use vigil_core::domain::job::OutputRef;

use crate::BatchClient;
use crate::error::Result;

impl BatchClient {
    /// Download the raw content of an output file
    ///
    /// # Arguments
    /// * `output` - Reference to the file (e.g. `files/batch-abc`)
    ///
    /// # Returns
    /// The file bytes exactly as served
    pub async fn download_file(&self, output: &OutputRef) -> Result<Vec<u8>> {
        let url = self.download_url(output);
        debug!("Downloading {}", url);

        let response = self
            .client
            .get(&url)
            .header(crate::API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        self.handle_bytes_response(response).await
    }

    pub(crate) fn download_url(&self, output: &OutputRef) -> String {
        format!(
            "{}/{}:download?alt=media",
            self.download_base_url,
            output.as_str().trim_start_matches('/')
        )
    }
}
