use fixcmp_core::{CodecError, DomainError};
use thiserror::Error;

use crate::config::ConfigError;

/// Failures that abort a whole run. Per-case invocation failures are not
/// errors at this level; they become [`crate::sample::FailedCase`]s.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid input: {0}")]
    Domain(#[from] DomainError),
    #[error("fixed-point encoding failed: {0}")]
    Codec(#[from] CodecError),
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
