//! HMAC-SHA256 signing and constant-time verification.

use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the notification signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Optional scheme prefix in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

fn digest(payload: &[u8], secret: &str) -> Option<[u8; 32]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);

    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Some(out)
}

/// Computes the signature header value for `payload`: `sha256=<hex>`.
///
/// # Example
///
/// ```
/// use paygate::webhook::{sign_payload, verify_signature};
///
/// let body = br#"{"merchantOrderId":"ORD1","status":"success"}"#;
/// let signature = sign_payload(body, "whsec");
///
/// assert!(signature.starts_with("sha256="));
/// assert!(verify_signature(body, Some(&signature), "whsec"));
/// ```
#[must_use]
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    // HMAC hashes or pads the key to its block size, so any length is accepted.
    let digest = digest(payload, secret).expect("HMAC-SHA256 accepts keys of any length");
    format!("{SIGNATURE_PREFIX}{}", hex::encode(digest))
}

/// Verifies a webhook signature over the raw payload bytes.
///
/// `signature` is the header value, with or without the `sha256=` prefix.
/// Returns `false` when the header is absent or empty, is not hex, has the
/// wrong length, or does not match. The comparison runs in constant time
/// with respect to the digest contents.
#[must_use]
pub fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let Some(header) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };

    let encoded = header.strip_prefix(SIGNATURE_PREFIX).unwrap_or(header);
    let Ok(provided) = hex::decode(encoded) else {
        return false;
    };

    let Some(expected) = digest(payload, secret) else {
        return false;
    };
    if provided.len() != expected.len() {
        return false;
    }

    provided.as_slice().ct_eq(expected.as_slice()).into()
}

/// Verifies a notification using the [`SIGNATURE_HEADER`] from `headers`.
///
/// A header value that is not valid visible ASCII is treated as absent.
#[must_use]
pub fn verify_request(headers: &HeaderMap, payload: &[u8], secret: &str) -> bool {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    verify_signature(payload, signature, secret)
}
