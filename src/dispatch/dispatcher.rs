//! Retrying request dispatcher.

use std::time::Duration;

use http::StatusCode;
use serde_json::Value;

use crate::error::Error;
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, HttpRequest, HttpResponse, TransportError};

use super::RetryPolicy;

/// Key of the wrapper object returned for 2xx bodies that are not JSON.
pub const RAW_BODY_KEY: &str = "raw";

/// Executes requests with per-attempt timeouts and exponential backoff.
///
/// Response classification:
///
/// | Outcome | Action |
/// |---------|--------|
/// | 2xx | decode JSON (or wrap raw text), done |
/// | 401 / 403 | [`Error::Auth`], no retry |
/// | 404 | [`Error::NotFound`], no retry |
/// | 429 with `Retry-After` | retry after `max(hint, backoff)` |
/// | 429 without `Retry-After` | [`Error::RateLimit`], no retry |
/// | 5xx | retry after backoff, then [`Error::Http`] |
/// | other status | [`Error::Http`], no retry |
/// | transport failure / timeout | retry after backoff, then [`Error::Transport`] |
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between attempts (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```
/// use paygate::dispatch::{Dispatcher, RetryPolicy};
/// use paygate::transport::ReqwestClient;
///
/// let dispatcher = Dispatcher::new(ReqwestClient::new(), RetryPolicy::new().with_max_retries(2));
/// assert_eq!(dispatcher.policy().max_attempts(), 3);
/// ```
#[derive(Debug)]
pub struct Dispatcher<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    policy: RetryPolicy,
}

impl<H> Dispatcher<H, TokioSleeper> {
    /// Creates a dispatcher that sleeps with [`TokioSleeper`].
    #[must_use]
    pub const fn new(client: H, policy: RetryPolicy) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            policy,
        }
    }
}

impl<H, S> Dispatcher<H, S> {
    /// Sets a custom sleeper for retry delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Dispatcher<H, S2> {
        Dispatcher {
            client: self.client,
            sleeper,
            policy: self.policy,
        }
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }
}

/// Why a single attempt did not produce a value.
enum Failure {
    /// Surfaces to the caller immediately.
    Fatal(Error),
    /// May be retried; `retry_after` is the server's hint, if usable.
    Transient {
        error: Error,
        retry_after: Option<Duration>,
    },
}

impl Failure {
    const fn transient(error: Error) -> Self {
        Self::Transient {
            error,
            retry_after: None,
        }
    }
}

impl<H: HttpClient, S: Sleeper> Dispatcher<H, S> {
    /// Executes `request` until it succeeds, fails terminally, or the retry
    /// budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the classification of the last attempt; see the type-level
    /// table.
    pub async fn dispatch(&self, request: &HttpRequest) -> Result<Value, Error> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempts,
                "Sending request"
            );

            let (error, retry_after) = match self.attempt(request).await {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(error)) => return Err(error),
                Err(Failure::Transient { error, retry_after }) => (error, retry_after),
            };

            if !self.policy.should_retry(attempts) {
                tracing::debug!(attempts, "Retry budget exhausted: {error}");
                return Err(error);
            }

            let delay = self.policy.delay_with_hint(attempts, retry_after);
            tracing::warn!(
                attempt = attempts,
                max_attempts = self.policy.max_attempts(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Request failed, retrying: {error}"
            );
            self.sleeper.sleep(delay).await;
        }
    }

    /// Performs one exchange under the per-attempt deadline.
    ///
    /// The exchange future is dropped when the deadline fires, which
    /// releases the attempt's timer and connection on every path.
    async fn attempt(&self, request: &HttpRequest) -> Result<Value, Failure> {
        let exchange = self.client.request(request.clone());

        match tokio::time::timeout(self.policy.timeout, exchange).await {
            Ok(Ok(response)) => classify(&response),
            Ok(Err(e)) => Err(Failure::transient(e.into())),
            Err(_elapsed) => Err(Failure::transient(TransportError::Timeout.into())),
        }
    }
}

/// Maps a completed exchange to a value or a failure.
fn classify(response: &HttpResponse) -> Result<Value, Failure> {
    let status = response.status;

    if status.is_success() {
        return Ok(decode_body(&response.body));
    }

    let body = response.body_lossy();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(Failure::Fatal(Error::Auth { status, body }))
        }
        StatusCode::NOT_FOUND => Err(Failure::Fatal(Error::NotFound { body })),
        StatusCode::TOO_MANY_REQUESTS => Err(classify_rate_limit(response, body)),
        s if s.is_server_error() => Err(Failure::transient(Error::Http { status, body })),
        _ => Err(Failure::Fatal(Error::Http { status, body })),
    }
}

/// A 429 is only retried when the server says when to come back.
///
/// A hint that is present but unreadable still counts; the retry then waits
/// for the regular backoff.
fn classify_rate_limit(response: &HttpResponse, body: String) -> Failure {
    let Some(raw) = response.headers.get(http::header::RETRY_AFTER) else {
        return Failure::Fatal(Error::RateLimit {
            retry_after: None,
            body,
        });
    };

    let retry_after = raw.to_str().ok().and_then(parse_retry_after);
    Failure::Transient {
        error: Error::RateLimit { retry_after, body },
        retry_after,
    }
}

/// Parses a `Retry-After` value expressed in seconds.
///
/// Returns `None` for anything that is not a non-negative number, such as
/// the HTTP-date form.
#[must_use]
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Decodes a success body as JSON, wrapping non-JSON text.
#[must_use]
pub fn decode_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| {
        let mut wrapper = serde_json::Map::new();
        wrapper.insert(
            RAW_BODY_KEY.to_string(),
            Value::String(String::from_utf8_lossy(body).into_owned()),
        );
        Value::Object(wrapper)
    })
}
