use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No export file found for source {0}")]
    SourceUnavailable(String),

    #[error("Malformed export for source {source_name} at {}: {reason}", .path.display())]
    SourceMalformed {
        source_name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("No sources available: every source export is missing or malformed")]
    NoSourcesAvailable,

    #[error("Failed to write artifact {}: {reason}", .path.display())]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("No combined artifact found in {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Notifier configuration error: {0}")]
    NotifierConfig(String),

    #[error("Mail API error: {0}")]
    Mail(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
