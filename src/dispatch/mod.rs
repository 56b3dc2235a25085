//! Resilient request dispatch.
//!
//! This module provides:
//! - Logical request descriptions ([`RequestSpec`], [`RequestBody`])
//! - Timeout and backoff configuration ([`RetryPolicy`])
//! - The retrying executor ([`Dispatcher`])

mod dispatcher;
mod policy;
mod request;

#[cfg(test)]
mod dispatcher_tests;

pub use dispatcher::{Dispatcher, RAW_BODY_KEY, decode_body, parse_retry_after};
pub use policy::RetryPolicy;
pub use request::{RequestBody, RequestSpec};
