// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("History consistency violation: {0}")]
    Consistency(String),

    #[error("Diff notification failed for {stem}: {message}")]
    Notification { stem: String, message: String },

    #[error("Malformed changelog line {line}: {message}")]
    ChangelogParse { line: usize, message: String },

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
