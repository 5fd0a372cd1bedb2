//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod check;
mod seal;
mod submit;

pub use check::CheckArgs;
pub use seal::{SealArgs, VerifyArgs};
pub use submit::SubmitArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a batch job and remember its name
    Submit(SubmitArgs),
    /// Check a batch job, optionally waiting for it and downloading results
    Check(CheckArgs),
    /// Seal a JSON payload into a hash-stamped envelope
    Seal(SealArgs),
    /// Verify that an envelope's hash still matches its payload
    Verify(VerifyArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit(args) => submit::handle_submit(args, config).await,
        Commands::Check(args) => check::handle_check(args, config).await,
        Commands::Seal(args) => seal::handle_seal(args).await,
        Commands::Verify(args) => seal::handle_verify(args).await,
    }
}
