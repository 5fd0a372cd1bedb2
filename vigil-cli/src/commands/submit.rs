//! Submit command handler
//!
//! Creates a batch job from a requests file and records its name in the
//! job file so a later `check` can pick it up.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use tracing::info;
use vigil_client::BatchApi;
use vigil_core::dto::batch::{CreateBatchRequest, parse_request_entries};

use crate::config::Config;
use crate::job_file::{DEFAULT_JOB_FILE, save_job_name};

#[derive(Args)]
pub struct SubmitArgs {
    /// Model to run the batch on (e.g. gemini-2.5-flash)
    #[arg(short, long)]
    pub model: String,

    /// Requests file: a JSON array or one JSON request per line
    #[arg(short, long)]
    pub requests: PathBuf,

    /// Display name for the batch (defaults to the requests file name)
    #[arg(long)]
    pub display_name: Option<String>,

    /// File the job name is written to
    #[arg(long, default_value = DEFAULT_JOB_FILE)]
    pub job_file: PathBuf,
}

/// Handle the submit command
pub async fn handle_submit(args: SubmitArgs, config: &Config) -> Result<()> {
    let client = config.batch_client()?;

    let name = submit_batch(&client, &args).await?;

    println!("{} {}", "✓ Submitted batch".green(), name.cyan());
    println!(
        "  Saved to {} (run `vigil check` to follow it)",
        args.job_file.display().to_string().dimmed()
    );

    Ok(())
}

/// Read requests, create the batch and persist its name
async fn submit_batch(api: &dyn BatchApi, args: &SubmitArgs) -> Result<String> {
    let text = tokio::fs::read_to_string(&args.requests)
        .await
        .with_context(|| format!("Failed to read {}", args.requests.display()))?;

    let entries = parse_request_entries(&text)
        .with_context(|| format!("Failed to parse requests in {}", args.requests.display()))?;

    if entries.is_empty() {
        anyhow::bail!("{} contains no requests", args.requests.display());
    }

    let display_name = args.display_name.clone().unwrap_or_else(|| {
        args.requests
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vigil-batch".to_string())
    });

    info!(
        "Submitting {} request(s) to {} as '{}'",
        entries.len(),
        args.model,
        display_name
    );

    let request = CreateBatchRequest::new(display_name, entries);
    let created = api
        .create_batch(&args.model, &request)
        .await
        .context("Failed to create batch")?;

    save_job_name(&args.job_file, &created.name)?;
    info!("Saved job name {} to {}", created.name, args.job_file.display());

    Ok(created.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    fn args(dir: &std::path::Path, requests: &str) -> SubmitArgs {
        let path = dir.join("requests.jsonl");
        std::fs::write(&path, requests).unwrap();
        SubmitArgs {
            model: "gemini-2.5-flash".to_string(),
            requests: path,
            display_name: None,
            job_file: dir.join("latest_job_id.txt"),
        }
    }

    #[tokio::test]
    async fn test_submit_writes_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "{\"contents\":[]}\n{\"contents\":[]}\n");
        let api = FakeApi::new(Vec::new());

        let name = submit_batch(&api, &args).await.unwrap();

        assert_eq!(name, "batches/created");
        assert_eq!(
            std::fs::read_to_string(&args.job_file).unwrap(),
            "batches/created\n"
        );
        assert_eq!(api.created(), vec![("gemini-2.5-flash".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_empty_requests_rejected_before_remote_call() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "\n\n");
        let api = FakeApi::new(Vec::new());

        assert!(submit_batch(&api, &args).await.is_err());
        assert!(api.created().is_empty());
        assert!(!args.job_file.exists());
    }

    #[tokio::test]
    async fn test_malformed_requests_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "{not json");
        let api = FakeApi::new(Vec::new());

        assert!(submit_batch(&api, &args).await.is_err());
        assert!(api.created().is_empty());
    }
}
