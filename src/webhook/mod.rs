//! Webhook notification authenticity.
//!
//! The service signs each notification body with HMAC-SHA256 under a
//! pre-shared secret and sends the result in the [`SIGNATURE_HEADER`]
//! header as `sha256=<hex>`. Receivers must verify the exact bytes they
//! received, before parsing, and reject the notification on failure.

mod signature;


pub use signature::{
    SIGNATURE_HEADER, SIGNATURE_PREFIX, sign_payload, verify_request, verify_signature,
};
