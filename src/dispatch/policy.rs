//! Retry policy configuration for dispatched requests.

use std::time::Duration;

/// Timeout and exponential backoff settings for one logical request.
///
/// A request is attempted at most `max_retries + 1` times. The n-th retry
/// (n starting at 1) waits `backoff_factor * 2^(n-1)` seconds. There is no
/// jitter and no cap; the retry budget bounds the total wait.
///
/// # Defaults
///
/// - `timeout`: 30 seconds per attempt
/// - `max_retries`: 3
/// - `backoff_factor`: 0.5
///
/// # Example
///
/// ```
/// use paygate::dispatch::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_retries(2)
///     .with_backoff_factor(0.5)
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(policy.delay_for_retry(1), Duration::from_millis(500));
/// assert_eq!(policy.delay_for_retry(2), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Deadline for a single attempt, measured from when it starts.
    pub timeout: Duration,

    /// Number of retries after the initial attempt.
    ///
    /// A value of 0 means only the initial attempt is made.
    pub max_retries: u32,

    /// Base delay in seconds; doubled for every further retry.
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Default per-attempt timeout (30 seconds).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default number of retries.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default backoff factor in seconds.
    pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.5;

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            backoff_factor: Self::DEFAULT_BACKOFF_FACTOR,
        }
    }

    /// Sets the per-attempt timeout.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "timeout must be greater than zero");
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries after the initial attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff factor in seconds.
    ///
    /// Zero is allowed and disables waiting between retries.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is negative or not finite.
    #[must_use]
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        assert!(
            factor >= 0.0 && factor.is_finite(),
            "backoff_factor must be a non-negative finite number"
        );
        self.backoff_factor = factor;
        self
    }

    /// Total number of attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns true if another attempt may follow `attempts_made` attempts.
    #[must_use]
    pub const fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts()
    }

    /// Computes the exponential delay before the n-th retry (1-based).
    ///
    /// `retry` 0 is treated as 1.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(63);
        // Safe cast: exponent is clamped to 63
        #[allow(clippy::cast_possible_wrap)]
        let scale = 2f64.powi(exponent as i32);
        let secs = self.backoff_factor * scale;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Computes the delay before the n-th retry, honoring a server hint.
    ///
    /// The server's `Retry-After` hint wins when it asks for a longer wait
    /// than the exponential schedule.
    #[must_use]
    pub fn delay_with_hint(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.delay_for_retry(retry);
        retry_after.map_or(backoff, |hint| hint.max(backoff))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
