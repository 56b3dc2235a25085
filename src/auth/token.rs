//! Cached bearer token.

use std::fmt;
use std::time::{Duration, SystemTime};

/// Time before expiry at which a token is already treated as expired.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// An access token with an absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    expires_at: SystemTime,
}

impl Token {
    /// Creates a token expiring at `expires_at`.
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Creates a token that lives for `lifetime` from `now`.
    #[must_use]
    pub fn expiring_in(
        access_token: impl Into<String>,
        now: SystemTime,
        lifetime: Duration,
    ) -> Self {
        Self::new(access_token, now + lifetime)
    }

    /// The raw access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Absolute expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Returns true if the token is still usable at `now`.
    ///
    /// A token with less than [`EXPIRY_MARGIN`] left is not usable.
    #[must_use]
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        now.checked_add(EXPIRY_MARGIN)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

// The access token never appears in logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn valid_well_before_expiry() {
        let token = Token::new("abc", at(1_000));

        assert!(token.is_valid_at(at(900)));
    }

    #[test]
    fn invalid_inside_safety_margin() {
        let token = Token::new("abc", at(1_000));

        assert!(token.is_valid_at(at(989)));
        assert!(!token.is_valid_at(at(990)));
        assert!(!token.is_valid_at(at(995)));
    }

    #[test]
    fn invalid_after_expiry() {
        let token = Token::new("abc", at(1_000));

        assert!(!token.is_valid_at(at(2_000)));
    }

    #[test]
    fn expiring_in_adds_lifetime() {
        let token = Token::expiring_in("abc", at(100), Duration::from_secs(3600));

        assert_eq!(token.expires_at(), at(3_700));
    }

    #[test]
    fn zero_lifetime_is_never_valid() {
        let token = Token::expiring_in("abc", at(100), Duration::ZERO);

        assert!(!token.is_valid_at(at(100)));
    }

    #[test]
    fn debug_redacts_access_token() {
        let token = Token::new("super-secret", at(1));
        let debug = format!("{token:?}");

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}
