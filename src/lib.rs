//! paygate: client for a remote payment-processing API
//!
//! Authenticates requests with a static API key or an OAuth password-grant
//! token, dispatches payment operations with bounded retries, and verifies
//! HMAC-SHA256 webhook signatures.

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod time;
pub mod transport;
pub mod webhook;

#[cfg(test)]
mod test_fixtures;

pub use error::Error;
