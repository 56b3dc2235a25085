//! Error taxonomy shared by every public client operation.

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Terminal outcome of a failed client operation.
///
/// Retryable conditions (rate limiting with a hint, server errors and
/// transport failures) are absorbed by the dispatcher while retry budget
/// remains; callers only ever see the last one.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid environment, missing credentials for an operation, or a
    /// request that cannot be addressed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login completed but did not yield a usable token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The service rejected the credentials (401/403). Never retried.
    #[error("Authorization rejected with status {status}: {body}")]
    Auth {
        /// Response status (401 or 403)
        status: StatusCode,
        /// Response body text
        body: String,
    },

    /// The requested resource does not exist (404). Never retried.
    #[error("Resource not found: {body}")]
    NotFound {
        /// Response body text
        body: String,
    },

    /// Rate limited (429) without a usable hint or retry budget.
    #[error("Rate limited: {body}")]
    RateLimit {
        /// Parsed `Retry-After` hint from the last response, if any
        retry_after: Option<Duration>,
        /// Response body text
        body: String,
    },

    /// Any other non-success status.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// Response status
        status: StatusCode,
        /// Response body text
        body: String,
    },

    /// Network failure or timeout, propagated as-is once retries run out.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Auth { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::RateLimit { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }

    /// Returns true if this kind of failure is eligible for retry.
    ///
    /// A rate limit is only retried when the server sent a hint, so the
    /// dispatcher decides that case from the response rather than here.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}
