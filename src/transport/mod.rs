//! Transport capability: a single HTTP exchange.
//!
//! The dispatcher never talks to a concrete HTTP library. It is handed an
//! [`HttpClient`] at construction time; production code uses
//! [`ReqwestClient`], tests use in-memory mocks.

mod client;
mod error;
mod http;

#[cfg(test)]
mod client_tests;

pub use client::ReqwestClient;
pub use error::TransportError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
