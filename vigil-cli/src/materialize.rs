//! Result materialization
//!
//! Downloads the output of a succeeded job and writes it verbatim to disk.
//! Every failure here is soft: it is logged and the caller carries on.

use std::path::PathBuf;
use tracing::{error, info, warn};
use vigil_client::BatchApi;
use vigil_core::domain::job::JobSnapshot;

/// Default location of downloaded results
pub const DEFAULT_RESULTS_FILE: &str = "batch_results.jsonl";

/// Writes job output to a fixed local file
#[derive(Debug, Clone)]
pub struct Materializer {
    output_path: PathBuf,
}

impl Materializer {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// Download and persist the job's output
    ///
    /// Returns the downloaded bytes, or `None` if there was no output
    /// reference or the download or write failed.
    pub async fn materialize(&self, api: &dyn BatchApi, snapshot: &JobSnapshot) -> Option<Vec<u8>> {
        let Some(output) = &snapshot.output else {
            warn!("Job {} reports no output file", snapshot.name);
            return None;
        };

        info!("Downloading {}", output.as_str());
        let content = match api.download_file(output).await {
            Ok(content) => content,
            Err(e) => {
                error!("Download of {} failed: {}", output.as_str(), e);
                return None;
            }
        };

        if let Err(e) = tokio::fs::write(&self.output_path, &content).await {
            error!(
                "Failed to write results to {}: {}",
                self.output_path.display(),
                e
            );
            return None;
        }

        info!(
            "Saved {} bytes of results to {}",
            content.len(),
            self.output_path.display()
        );
        Some(content)
    }
}
