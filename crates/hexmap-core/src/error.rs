use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid hex address: {0}")]
    InvalidAddress(String),

    #[error("Invalid address record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error(
        "Address lists differ in length (old: {old}, new: {new}); check that both inputs are aligned"
    )]
    LengthMismatch { old: usize, new: usize },

    #[error("Reference file {0} is missing; restore it before running again")]
    MissingReference(PathBuf),

    #[error("No source files found in {0}")]
    NoSourceFiles(PathBuf),

    #[error(
        "Patch root not found; run inside the sfse folder or point to it with --path (tried {0})"
    )]
    PatchRootNotFound(PathBuf),

    #[error("Invalid patch rule for {file}: {message}")]
    InvalidRule { file: String, message: String },

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
