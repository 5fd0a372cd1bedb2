//! ID resolver module
//!
//! Decides which batch job the `check` command should look at. The decision
//! is split in two: [`select_strategy`] is a pure function of what the
//! operator supplied, and [`resolve_job_name`] carries the chosen strategy
//! out through a [`Prompter`], so the whole flow runs without a terminal in
//! tests.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::job_file::read_saved_job_name;

/// How the job name will be obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Name given on the command line
    Explicit(String),
    /// Name found in the job file; may need confirmation
    Saved { value: String, auto_confirm: bool },
    /// Nothing usable yet; ask the operator
    Prompt,
}

/// Everything the operator told us about where the job name lives
#[derive(Debug, Clone)]
pub struct JobSource {
    pub explicit: Option<String>,
    pub job_file: PathBuf,
    pub auto_confirm: bool,
}

/// Interactive I/O used during resolution
pub trait Prompter {
    /// Show an informational line to the operator
    fn show(&mut self, message: &str);

    /// Ask a yes/no question; an empty answer means yes
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Ask for a free-form answer, returned trimmed
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Pick a strategy from the explicit value and the saved file contents
///
/// Priority: explicit value, then saved value, then prompt. An explicit
/// value is taken as-is once trimmed, even if that leaves it empty; a blank
/// saved value counts as absent.
pub fn select_strategy(explicit: Option<&str>, saved: Option<&str>, auto_confirm: bool) -> Strategy {
    if let Some(explicit) = explicit {
        return Strategy::Explicit(explicit.trim().to_string());
    }

    match saved.map(str::trim) {
        Some(value) if !value.is_empty() => Strategy::Saved {
            value: value.to_string(),
            auto_confirm,
        },
        _ => Strategy::Prompt,
    }
}

/// Carry out a strategy
///
/// Returns the job name, or an empty string when the operator gave none; the
/// caller treats empty as "abort".
pub fn resolve_job_name(strategy: Strategy, prompter: &mut dyn Prompter) -> Result<String> {
    match strategy {
        Strategy::Explicit(value) => Ok(value),
        Strategy::Saved {
            value,
            auto_confirm,
        } => {
            prompter.show(&format!("Found saved job: {}", value));
            if auto_confirm || prompter.confirm("Check this job? (Y/n): ")? {
                return Ok(value);
            }
            ask_for_name(prompter)
        }
        Strategy::Prompt => ask_for_name(prompter),
    }
}

/// Read the job file and resolve in one step
pub fn resolve_from_source(source: &JobSource, prompter: &mut dyn Prompter) -> Result<String> {
    let saved = read_saved_job_name(&source.job_file);
    let strategy = select_strategy(
        source.explicit.as_deref(),
        saved.as_deref(),
        source.auto_confirm,
    );
    resolve_job_name(strategy, prompter)
}

fn ask_for_name(prompter: &mut dyn Prompter) -> Result<String> {
    prompter
        .ask("Enter job name (e.g. batches/xxxx): ")
        .map(|answer| answer.trim().to_string())
}

/// Prompter backed by stdin/stdout
pub struct ConsolePrompter;

impl ConsolePrompter {
    fn read_answer(&mut self, question: &str) -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", question).context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read answer from stdin")?;
        Ok(line.trim().to_string())
    }
}

impl Prompter for ConsolePrompter {
    fn show(&mut self, message: &str) {
        println!("{}", message);
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_answer(question)?;
        Ok(matches!(answer.to_lowercase().as_str(), "" | "y"))
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.read_answer(question)
    }
}
