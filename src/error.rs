// Typed errors for the clustering core and persistence layer.
//
// The CLI and pipeline work in anyhow::Result like the rest of the crate;
// these variants exist so callers can tell a configuration mistake or a
// missing model apart from an ordinary I/O failure.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillmatchError {
    /// Bad cluster count, unparseable option, out-of-range cluster id, etc.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A persisted artifact or table is missing or cannot be decoded.
    #[error("Resources unavailable ({}): {reason}", .path.display())]
    ResourcesUnavailable { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SkillmatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ResourcesUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that should be shown to the viewer as "resources unavailable".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ResourcesUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SkillmatchError>;
