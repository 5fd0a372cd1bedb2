//! Saved job-name file
//!
//! `submit` writes the name of the batch it created; `check` reads it back.
//! Writes are neither locked nor atomic: the last writer wins.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Default location of the saved job name
pub const DEFAULT_JOB_FILE: &str = "latest_job_id.txt";

/// Read the saved job name, if the file exists and holds anything
///
/// An unreadable file is reported and treated as absent.
pub fn read_saved_job_name(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Err(e) => {
            warn!("Could not read job file {}: {}", path.display(), e);
            None
        }
    }
}

/// Write a job name to the file, replacing previous contents, and sync it
pub fn save_job_name(path: &Path, name: &str) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create job file {}", path.display()))?;

    writeln!(file, "{}", name.trim())
        .with_context(|| format!("Failed to write job file {}", path.display()))?;

    file.sync_all()
        .with_context(|| format!("Failed to sync job file {}", path.display()))?;

    Ok(())
}
