//! Error types for the RSS generator.

use thiserror::Error;

/// Common error type for the RSS generator.
#[derive(Error, Debug)]
pub enum GelrssError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to the upstream API.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Upstream answered but the body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// RSS document could not be produced.
    #[error("render error: {0}")]
    Render(String),

    /// A refresh task ended without producing an outcome (panic or cancellation).
    #[error("refresh task failed: {0}")]
    Task(String),
}

/// Result type alias for RSS generator operations.
pub type Result<T> = std::result::Result<T, GelrssError>;
