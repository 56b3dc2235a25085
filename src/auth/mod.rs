//! Credential handling.
//!
//! [`AuthProvider`] decides, per request, which bearer credential (if any)
//! to attach. Tokens are obtained by
//! [`PaymentClient::login`](crate::client::PaymentClient::login).

mod provider;
mod token;


pub use provider::{AuthProvider, bearer};
pub use token::{EXPIRY_MARGIN, Token};
