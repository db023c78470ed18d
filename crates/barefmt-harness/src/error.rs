//! Harness error type.

use barefmt_core::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),
    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

impl HarnessError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
