//! Check command handler
//!
//! Resolves which job to look at, polls it, and on success downloads and
//! previews the results.

use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use vigil_core::domain::job::{JobName, JobSnapshot, JobState};
use vigil_core::preview::{DEFAULT_PREVIEW_LINES, render_preview};

use crate::config::Config;
use crate::id_resolver::{ConsolePrompter, JobSource, resolve_from_source};
use crate::job_file::DEFAULT_JOB_FILE;
use crate::materialize::{DEFAULT_RESULTS_FILE, Materializer};
use crate::scheduler::{JobPoller, PollOutcome, PollPolicy, TokioClock};

#[derive(Args)]
pub struct CheckArgs {
    /// Job name to check (e.g. batches/abc123); overrides the job file
    #[arg(long)]
    pub job: Option<String>,

    /// File holding the last submitted job name
    #[arg(long, default_value = DEFAULT_JOB_FILE)]
    pub job_file: PathBuf,

    /// Keep polling until the job finishes
    #[arg(long)]
    pub wait: bool,

    /// Download results when the job succeeds (the default)
    #[arg(long, overrides_with = "no_download")]
    pub download: bool,

    /// Do not download results
    #[arg(long, overrides_with = "download")]
    pub no_download: bool,

    /// Use the saved job name without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Where downloaded results are written
    #[arg(long, default_value = DEFAULT_RESULTS_FILE)]
    pub output: PathBuf,

    /// Seconds between status checks when waiting
    #[arg(long, env = "VIGIL_POLL_INTERVAL", default_value_t = 30)]
    pub interval: u64,

    /// Stop waiting after this many status checks
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Number of result lines to preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_LINES)]
    pub preview_lines: usize,
}

impl CheckArgs {
    fn policy(&self) -> Result<PollPolicy> {
        if self.interval == 0 {
            anyhow::bail!("--interval must be greater than 0");
        }
        if self.max_attempts == Some(0) {
            anyhow::bail!("--max-attempts must be greater than 0");
        }

        Ok(PollPolicy {
            interval: Duration::from_secs(self.interval),
            max_attempts: self.max_attempts,
            wait: self.wait,
        })
    }

    fn materializer(&self) -> Option<Materializer> {
        // `download` only matters as the counterpart of `no_download`
        let download = self.download || !self.no_download;
        download.then(|| Materializer::new(&self.output))
    }
}

/// Handle the check command
pub async fn handle_check(args: CheckArgs, config: &Config) -> Result<()> {
    let policy = args.policy()?;
    let client = config.batch_client()?;

    let source = JobSource {
        explicit: args.job.clone(),
        job_file: args.job_file.clone(),
        auto_confirm: args.yes,
    };
    let raw_name = resolve_from_source(&source, &mut ConsolePrompter)?;

    let Some(name) = JobName::new(&raw_name) else {
        println!("{}", "No job name given, nothing to check.".yellow());
        return Ok(());
    };

    info!("Checking job {}", name);

    let poller = JobPoller::new(
        Arc::new(client),
        Arc::new(TokioClock),
        policy,
        args.materializer(),
    );

    let outcome = poller.run(&name).await;
    print_outcome(&outcome, args.preview_lines);

    Ok(())
}

/// Print the final state of a poll run
fn print_outcome(outcome: &PollOutcome, preview_lines: usize) {
    match outcome {
        PollOutcome::Succeeded { snapshot, content } => {
            print_status(snapshot);
            if let Some(content) = content {
                print_preview(content, preview_lines);
            }
        }
        PollOutcome::Finished { snapshot } => {
            print_status(snapshot);
            if let Some(reason) = &snapshot.error {
                println!("  Reason: {}", reason.red());
            }
        }
        PollOutcome::StillRunning { snapshot } => {
            print_status(snapshot);
            println!(
                "{}",
                "⏳ Job not finished yet (use --wait to keep polling)".yellow()
            );
        }
        PollOutcome::Exhausted { snapshot, attempts } => {
            print_status(snapshot);
            println!(
                "{}",
                format!("⏳ Still not finished after {} checks", attempts).yellow()
            );
        }
    }
}

fn print_status(snapshot: &JobSnapshot) {
    println!(
        "  {} {}  {}",
        "▸".cyan(),
        snapshot.name.dimmed(),
        colorize_state(snapshot.state)
    );
}

/// Notice shown when downloaded results cannot be rendered
const PREVIEW_UNAVAILABLE: &str = "  (cannot preview results as JSON)";

/// Print the first lines of downloaded results as pretty JSON
fn print_preview(content: &[u8], lines: usize) {
    let block = preview_block(content, lines);
    if block.is_empty() {
        return;
    }

    println!("\n{}", "--- Preview ---".bold());
    for entry in block {
        println!("{}", entry);
    }
}

/// Lines of the preview section, or the generic notice if rendering fails
fn preview_block(content: &[u8], lines: usize) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    match render_preview(content, lines) {
        Ok(rendered) => rendered,
        Err(e) => {
            debug!("Preview failed: {}", e);
            vec![PREVIEW_UNAVAILABLE.dimmed().to_string()]
        }
    }
}

/// Colorize job state for display
fn colorize_state(state: JobState) -> ColoredString {
    let label = state.as_str();
    match state {
        JobState::Pending => label.yellow(),
        JobState::Running => label.cyan(),
        JobState::Succeeded => label.green(),
        JobState::Failed | JobState::Expired => label.red(),
        JobState::Cancelled => label.dimmed(),
        JobState::Unknown => label.magenta(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        check: CheckArgs,
    }

    fn parse(args: &[&str]) -> CheckArgs {
        let mut argv = vec!["vigil-check"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).check
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.job_file, PathBuf::from("latest_job_id.txt"));
        assert_eq!(args.output, PathBuf::from("batch_results.jsonl"));
        assert_eq!(args.preview_lines, 2);
        assert!(!args.wait);
        assert!(!args.yes);

        let policy = args.policy().unwrap();
        assert_eq!(policy.interval, Duration::from_secs(30));
        assert_eq!(policy.max_attempts, None);
        assert!(args.materializer().is_some());
    }

    #[test]
    fn test_no_download_disables_materializer() {
        assert!(parse(&["--no-download"]).materializer().is_none());
        assert!(parse(&["--no-download", "--download"]).materializer().is_some());
        assert!(parse(&["--download", "--no-download"]).materializer().is_none());
    }

    #[test]
    fn test_flags() {
        let args = parse(&["--job", "batches/x", "--wait", "-y", "--max-attempts", "4"]);
        assert_eq!(args.job.as_deref(), Some("batches/x"));
        assert!(args.wait);
        assert!(args.yes);
        assert_eq!(args.policy().unwrap().max_attempts, Some(4));
    }

    #[test]
    fn test_preview_of_malformed_results_shows_notice() {
        let block = preview_block(b"not json\n{\"b\":2}\n", 2);
        assert_eq!(block.len(), 1);
        assert!(block[0].contains(PREVIEW_UNAVAILABLE.trim()));

        let block = preview_block(&[0xff, 0xfe], 2);
        assert_eq!(block.len(), 1);
        assert!(block[0].contains(PREVIEW_UNAVAILABLE.trim()));
    }

    #[test]
    fn test_preview_of_valid_results() {
        let block = preview_block(b"{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n", 2);
        assert_eq!(block.len(), 2);
        assert!(block[0].starts_with("[1] "));
        assert!(preview_block(b"", 2).is_empty());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(parse(&["--interval", "0"]).policy().is_err());
        assert!(parse(&["--max-attempts", "0"]).policy().is_err());
    }
}
