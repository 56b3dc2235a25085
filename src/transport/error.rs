//! Error types for transport operations.

use thiserror::Error;

/// Failure of a single HTTP exchange.
///
/// Describes what went wrong at the network level. Status codes are not
/// errors here; classifying responses is the dispatcher's job.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// TLS failures and errors while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The exchange did not complete before its deadline.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the provided URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
