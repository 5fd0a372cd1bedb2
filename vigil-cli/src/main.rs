//! Vigil CLI
//!
//! Command-line interface for submitting generative-AI batch jobs, watching
//! them until they settle, collecting their results, and sealing JSON
//! payloads into hash-stamped envelopes.

mod commands;
mod config;
mod id_resolver;
mod job_file;
mod materialize;
mod scheduler;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_client::{DEFAULT_API_BASE_URL, DEFAULT_DOWNLOAD_BASE_URL};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Submit, watch and collect generative-AI batch jobs", long_about = None)]
struct Cli {
    /// API key for the batch service
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Batch API base URL
    #[arg(
        long,
        env = "VIGIL_API_BASE_URL",
        default_value = DEFAULT_API_BASE_URL,
        global = true
    )]
    api_base_url: String,

    /// Base URL for result downloads
    #[arg(
        long,
        env = "VIGIL_DOWNLOAD_BASE_URL",
        default_value = DEFAULT_DOWNLOAD_BASE_URL,
        global = true
    )]
    download_base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_cli=info,vigil_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_key: cli.api_key,
        api_base_url: cli.api_base_url,
        download_base_url: cli.download_base_url,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
