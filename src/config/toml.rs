//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// API endpoint and credential section
    #[serde(default)]
    pub client: ClientSection,

    /// OAuth password-grant section
    #[serde(default)]
    pub oauth: OAuthSection,

    /// Retry policy section
    #[serde(default)]
    pub retry: RetrySection,

    /// Webhook verification section
    #[serde(default)]
    pub webhook: WebhookSection,
}

/// API endpoint section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Deployment environment: "uat" or "live"
    pub environment: Option<String>,

    /// Base URL of the payment API
    pub base_url: Option<String>,

    /// Static API key
    pub api_key: Option<String>,
}

/// OAuth password-grant section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthSection {
    /// OAuth client id
    pub client_id: Option<String>,

    /// OAuth client secret
    pub client_secret: Option<String>,

    /// Username for the password grant
    pub username: Option<String>,

    /// Password for the password grant
    pub password: Option<String>,
}

/// Retry policy section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Per-attempt timeout in seconds
    pub timeout: Option<u64>,

    /// Number of retries after the first attempt
    pub max_retries: Option<u32>,

    /// Backoff factor in seconds
    pub backoff_factor: Option<f64>,
}

/// Webhook verification section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Shared secret for signature verification
    pub secret: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# paygate configuration file
#
# Credentials may also be supplied through the environment:
# PAYGATE_API_KEY, PAYGATE_CLIENT_ID, PAYGATE_CLIENT_SECRET,
# PAYGATE_USERNAME, PAYGATE_PASSWORD, PAYGATE_WEBHOOK_SECRET

[client]
# Deployment environment: "uat" or "live" (default: uat)
environment = "uat"

# Base URL of the payment API (required)
# base_url = "https://api.example.com"

# Static API key; when set it is used for every request
# api_key = "sk_test_..."

[oauth]
# Client credentials for the password grant
# client_id = "your-client-id"
# client_secret = "your-client-secret"

# Account used by `paygate login` and by commands when no API key is set
# username = "merchant"
# password = "..."

[retry]
# Per-attempt timeout in seconds (default: 30)
# timeout = 30

# Retries after the first attempt (default: 3)
# max_retries = 3

# Delay before retry n is backoff_factor * 2^(n-1) seconds (default: 0.5)
# backoff_factor = 0.5

[webhook]
# Shared secret for X-Signature verification
# secret = "whsec_..."
"#
    .to_string()
}
