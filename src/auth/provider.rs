//! Per-request credential selection.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use http::HeaderValue;

use super::Token;

/// Chooses the `Authorization` header for outgoing requests.
///
/// Precedence:
/// 1. A configured static API key, always.
/// 2. A cached token that is still valid (see [`Token::is_valid_at`]).
/// 3. Nothing; the request goes out unauthenticated and the service is
///    expected to reject it.
///
/// The cached token is the only shared mutable state of a client. Reads
/// take a snapshot; [`store`](Self::store) replaces it wholesale. Logins are
/// not serialized, so concurrent logins resolve as last write wins.
pub struct AuthProvider {
    api_key: Option<String>,
    token: RwLock<Option<Token>>,
}

impl AuthProvider {
    /// Creates a provider. An empty API key counts as no key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            token: RwLock::new(None),
        }
    }

    /// Returns true if a static API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Header value to attach at `now`, if any credential is usable.
    #[must_use]
    pub fn authorization(&self, now: SystemTime) -> Option<HeaderValue> {
        if let Some(key) = &self.api_key {
            return bearer(key);
        }

        self.token()
            .filter(|token| token.is_valid_at(now))
            .and_then(|token| bearer(token.access_token()))
    }

    /// Snapshot of the cached token, expired or not.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the cached token.
    pub fn store(&self, token: Token) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }
}

impl Default for AuthProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token())
            .finish()
    }
}

/// Builds a sensitive `Bearer <credential>` header value.
///
/// Returns `None` if the credential contains bytes not allowed in a header.
#[must_use]
pub fn bearer(credential: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {credential}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}
