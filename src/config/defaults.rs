//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default deployment environment.
pub const ENVIRONMENT: &str = "uat";

/// Default per-attempt timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Default backoff factor in seconds.
pub const BACKOFF_FACTOR: f64 = 0.5;

/// Default page size for transaction listing.
pub const LIST_LIMIT: u32 = 10;

/// Default page for transaction listing.
pub const LIST_PAGE: u32 = 1;

/// Default path written by `init`.
pub const CONFIG_FILE: &str = "paygate.toml";

/// Default per-attempt timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}
