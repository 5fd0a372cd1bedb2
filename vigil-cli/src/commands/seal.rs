//! Seal and verify command handlers
//!
//! Neither command touches the network, so neither needs an API key.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use vigil_core::domain::envelope::{ArtifactEnvelope, seal_value};

#[derive(Args)]
pub struct SealArgs {
    /// JSON payload file, or `-` for stdin
    pub input: PathBuf,

    /// Write the envelope to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Envelope file, or `-` for stdin
    pub input: PathBuf,
}

/// Handle the seal command
pub async fn handle_seal(args: SealArgs) -> Result<()> {
    let text = read_input(&args.input).await?;
    let envelope = seal_text(&text)?;
    let rendered = serde_json::to_string_pretty(&envelope).context("Failed to render envelope")?;

    match &args.out {
        Some(out) => {
            tokio::fs::write(out, format!("{}\n", rendered))
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "{} {} {}",
                "✓ Sealed".green(),
                envelope.artifact_id().cyan(),
                envelope.content_hash().dimmed()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Handle the verify command
pub async fn handle_verify(args: VerifyArgs) -> Result<()> {
    let text = read_input(&args.input).await?;
    let envelope: ArtifactEnvelope =
        serde_json::from_str(&text).context("Input is not a valid envelope")?;

    if envelope.verify() {
        println!(
            "{} {} {}",
            "✓ Intact".green(),
            envelope.artifact_id().cyan(),
            envelope.content_hash().dimmed()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "envelope {} does not match its content hash",
            envelope.artifact_id()
        )
    }
}

fn seal_text(text: &str) -> Result<ArtifactEnvelope> {
    let payload: Value = serde_json::from_str(text).context("Payload is not valid JSON")?;
    Ok(seal_value(payload)?)
}

async fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
