//! Immutable client settings.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::dispatch::RetryPolicy;
use crate::error::Error;

use super::Environment;

/// Settings for a [`PaymentClient`](super::PaymentClient).
///
/// Built once and never mutated afterwards: builder methods consume the
/// value and the client only exposes a shared reference.
///
/// # Example
///
/// ```
/// use paygate::client::{ClientConfig, Environment};
/// use std::time::Duration;
/// use url::Url;
///
/// let base_url = Url::parse("https://pay.example.com").unwrap();
/// let config = ClientConfig::new(Environment::Live, base_url)
///     .with_oauth("client-id", "client-secret")
///     .with_timeout(Duration::from_secs(10))
///     .with_max_retries(2);
///
/// assert_eq!(config.environment(), Environment::Live);
/// assert!(config.api_key().is_none());
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    environment: Environment,
    base_url: Url,
    api_key: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    retry_policy: RetryPolicy,
}

impl ClientConfig {
    /// Creates settings with no credentials and the default retry policy.
    #[must_use]
    pub fn new(environment: Environment, base_url: Url) -> Self {
        Self {
            environment,
            base_url,
            api_key: None,
            client_id: None,
            client_secret: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Sets the static API key. An empty key is ignored.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|key| !key.is_empty());
        self
    }

    /// Sets the OAuth client credentials used by login.
    #[must_use]
    pub fn with_oauth(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets only the OAuth client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets only the OAuth client secret.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the per-attempt timeout.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.retry_policy = self.retry_policy.with_timeout(timeout);
        self
    }

    /// Sets the number of retries after the initial attempt.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry_policy = self.retry_policy.with_max_retries(max_retries);
        self
    }

    /// Sets the backoff factor in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is negative or not finite.
    #[must_use]
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.retry_policy = self.retry_policy.with_backoff_factor(factor);
        self
    }

    /// Selected environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Base URL all relative paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Static API key, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// OAuth client id, if configured.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Retry and timeout settings.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns true if both OAuth client id and secret are set and non-empty.
    #[must_use]
    pub fn has_oauth(&self) -> bool {
        self.oauth_credentials().is_ok()
    }

    /// OAuth client id and secret, both required for login.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the missing value.
    pub fn oauth_credentials(&self) -> Result<(&str, &str), Error> {
        let client_id = self
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Configuration("OAuth client_id is not configured".to_string()))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                Error::Configuration("OAuth client_secret is not configured".to_string())
            })?;
        Ok((client_id, client_secret))
    }

    /// Path for an environment-scoped endpoint, e.g. `/live/login`.
    #[must_use]
    pub fn scoped_path(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.prefix(),
            endpoint.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &redact(&self.api_key))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}
