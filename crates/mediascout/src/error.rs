//! Error types for the Mediascout browser

use std::io;
use thiserror::Error;

/// Mediascout error type
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("Invalid date range: {0}")]
    DateRange(String),

    #[error("Metadata error for {path}: {message}")]
    Metadata { path: String, message: String },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ScanError {
    /// True when the scan stopped because the caller asked it to.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanError::Cancelled)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ScanError>;
