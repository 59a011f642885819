//! Clipstack - Error types
//!
//! One error enum per concern; loops log and absorb these, only startup propagates them.

use std::io;

/// Errors returned to callers of the engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("index {index} is out of range for history of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Clipboard backend error type
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with status {status}")]
    Exit { command: &'static str, status: i32 },
    #[error("clipboard error: {0}")]
    Arboard(#[from] arboard::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("image payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Startup failures that end the process
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("clipboard backend: {0}")]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
