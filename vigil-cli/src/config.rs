//! Configuration module
//!
//! Handles CLI configuration: credentials and service endpoints. Built once
//! in `main` and passed by reference to every command.

use anyhow::Result;
use vigil_client::BatchClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the batch service (`GOOGLE_API_KEY`)
    pub api_key: Option<String>,

    /// Base URL of the batch API
    pub api_base_url: String,

    /// Base URL used for result downloads
    pub download_base_url: String,
}

impl Config {
    /// Validates the configuration
    ///
    /// A missing API key is not an error here: commands that never reach the
    /// remote service (e.g. `seal`) run without one.
    pub fn validate(&self) -> Result<()> {
        for (label, url) in [
            ("api_base_url", &self.api_base_url),
            ("download_base_url", &self.download_base_url),
        ] {
            if url.is_empty() {
                anyhow::bail!("{} cannot be empty", label);
            }

            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", label);
            }
        }

        Ok(())
    }

    /// Build a client for the batch service
    ///
    /// Fails before any network traffic if no API key is configured.
    pub fn batch_client(&self) -> Result<BatchClient> {
        let api_key = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => anyhow::bail!("GOOGLE_API_KEY is not set (export it or add it to .env)"),
        };

        Ok(BatchClient::with_base_urls(
            api_key,
            &self.api_base_url,
            &self.download_base_url,
        ))
    }
}
