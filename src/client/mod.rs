//! Payment API client.
//!
//! This module provides:
//! - Deployment selection ([`Environment`])
//! - Immutable client settings ([`ClientConfig`])
//! - Request payloads ([`CreatePayment`], [`Customer`])
//! - The endpoint callers ([`PaymentClient`])

mod config;
mod environment;
mod payment_client;
mod types;

#[cfg(test)]
mod config_tests;

pub use config::ClientConfig;
pub use environment::Environment;
pub use payment_client::{IDEMPOTENCY_KEY_HEADER, PaymentClient};
pub use types::{CreatePayment, Customer};
