//! The network seam of the call client.
//!
//! A [`Transport`] performs exactly one request. Retry, timeout, and
//! cancellation policy live in [`super::CallClient`], so every transport
//! gets them for free.

use super::types::FailureKind;
use async_trait::async_trait;
use thiserror::Error;

/// Error from a single transport attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("endpoint returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Classify this error for the retry policy.
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::Connection(_) => FailureKind::Transient,
            TransportError::Status { code, .. } => classify_status(*code),
            TransportError::InvalidRequest(_) => FailureKind::Rejected,
            TransportError::InvalidResponse(_) | TransportError::Other(_) => FailureKind::Unknown,
        }
    }
}

/// Classify a non-success HTTP status code.
///
/// 408, 429 and 5xx are worth retrying; every other 4xx is the caller's
/// fault and will not change on retry.
pub fn classify_status(code: u16) -> FailureKind {
    match code {
        408 | 429 => FailureKind::Transient,
        500..=599 => FailureKind::Transient,
        400..=499 => FailureKind::Rejected,
        _ => FailureKind::Unknown,
    }
}

/// Sends a resolved prompt to a text-generation service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `prompt` and return the generated text.
    async fn send(&self, prompt: &str) -> Result<String, TransportError>;

    fn name(&self) -> &str;
}
