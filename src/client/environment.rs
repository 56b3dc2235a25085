//! Deployment environment of the remote service.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which deployment of the service to talk to.
///
/// The environment only changes the path prefix of the login, status and
/// list endpoints; payment creation is unprefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    /// Sandbox used for acceptance testing.
    #[default]
    Uat,
    /// Production.
    Live,
}

impl Environment {
    /// Path prefix for environment-scoped endpoints.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Uat => "/uat_mode",
            Self::Live => "/live",
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uat => "uat",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uat" => Ok(Self::Uat),
            "live" => Ok(Self::Live),
            other => Err(Error::Configuration(format!(
                "unknown environment '{other}': expected 'uat' or 'live'"
            ))),
        }
    }
}
