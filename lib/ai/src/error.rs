//! Error types for the AI crate.

use std::fmt;

/// Errors from model backend operations.
///
/// Any of these aborts the current dialogue turn; none are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider could not be reached.
    ProviderUnavailable { provider: String, reason: String },
    /// Request failed before a response was received.
    RequestFailed { reason: String },
    /// Provider answered with a non-success status.
    HttpStatus { status: u16, body: String },
    /// The response body did not match the Messages API shape.
    ResponseParseFailed { reason: String },
    /// No response within the client timeout.
    Timeout,
    /// HTTP 429, with the `retry-after` hint if one was sent.
    RateLimited { retry_after_secs: Option<u64> },
    /// Missing API key or unusable client settings.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "cannot reach model provider '{provider}': {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "model request failed: {reason}")
            }
            Self::HttpStatus { status, body } => {
                write!(f, "model provider answered HTTP {status}: {body}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "unreadable model response: {reason}")
            }
            Self::Timeout => write!(f, "model request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid model backend configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}
