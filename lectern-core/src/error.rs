//! Error types for Lectern Core
//!
//! The content engine itself never fails on chapter content: ambiguous or
//! degenerate input always degrades to a defined state. These errors cover the
//! edges around it, such as forcing a specific format or loading configuration.

use thiserror::Error;

/// Result type alias using LecternError
pub type Result<T> = std::result::Result<T, LecternError>;

/// Top-level error type for all Lectern operations
#[derive(Debug, Error)]
pub enum LecternError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors raised when a caller forces a specific content format
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid document tree: {0}")]
    InvalidTree(String),

    #[error("Document tree has no content list")]
    MissingContent,

    #[error("Invalid block id: {0}")]
    InvalidBlockId(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Errors in reader configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Page word budget must be at least 1, got {0}")]
    InvalidWordBudget(usize),

    #[error("Highlight class must not be empty")]
    EmptyHighlightClass,

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Errors fetching stored chapter content
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Chapter not found: {0}")]
    NotFound(String),

    #[error("Invalid chapter id: {0}")]
    InvalidChapterId(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
