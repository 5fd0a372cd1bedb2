//! Best-effort preview of downloaded JSONL results
//!
//! Used purely as a diagnostic after a download: callers print the rendered
//! lines, or a generic notice when rendering fails.

use thiserror::Error;

/// Number of lines previewed when the caller does not choose
pub const DEFAULT_PREVIEW_LINES: usize = 2;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("content is not valid UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("line {line} is not valid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Pretty-print the first `lines` JSON documents of a JSONL blob
///
/// Each entry is prefixed with its 1-based index. Empty content renders no
/// entries. The first undecodable line fails the whole preview.
pub fn render_preview(content: &[u8], lines: usize) -> Result<Vec<String>, PreviewError> {
    let text = std::str::from_utf8(content)?;

    text.lines()
        .take(lines)
        .enumerate()
        .map(|(i, line)| {
            let value: serde_json::Value =
                serde_json::from_str(line).map_err(|source| PreviewError::InvalidJson {
                    line: i + 1,
                    source,
                })?;
            let pretty = serde_json::to_string_pretty(&value).map_err(|source| {
                PreviewError::InvalidJson {
                    line: i + 1,
                    source,
                }
            })?;
            Ok(format!("[{}] {}", i + 1, pretty))
        })
        .collect()
}
