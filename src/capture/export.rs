//! Writes captured requests to disk.
//!
//! Each request becomes one `capture-NNN.<ext>` document. A non-empty
//! response body is written next to it as `capture-NNN.body`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::model::{CaptureDocument, RequestInfo};
use crate::config::ConfigError;

/// Document format for exported captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// TOML documents.
    #[default]
    Toml,
    /// Pretty-printed JSON documents.
    Json,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Toml => "toml",
            ExportFormat::Json => "json",
        }
    }

    fn render(&self, document: &CaptureDocument) -> Result<String> {
        Ok(match self {
            ExportFormat::Toml => document.to_toml()?,
            ExportFormat::Json => document.to_json()?,
        })
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toml" => Ok(ExportFormat::Toml),
            "json" => Ok(ExportFormat::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Writes `requests` into `dir`, creating it if needed. Returns the paths of
/// the written documents in request order.
pub fn export_captures(
    dir: &Path,
    requests: &[RequestInfo],
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let stem = format!("capture-{:03}", index + 1);

        let path = dir.join(format!("{}.{}", stem, format.extension()));
        let content = format.render(&CaptureDocument::from(request.clone()))?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if !request.response_body.is_empty() {
            let body_path = dir.join(format!("{}.body", stem));
            fs::write(&body_path, &request.response_body)
                .with_context(|| format!("Failed to write {}", body_path.display()))?;
        }

        debug!(path = %path.display(), url = %request.url, "capture exported");
        written.push(path);
    }

    Ok(written)
}
