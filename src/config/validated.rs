//! Validated configuration after merging CLI, environment and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::client::{ClientConfig, Environment};
use crate::dispatch::RetryPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Username and password for the OAuth password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Client settings (environment, base URL, credentials, retry policy)
    pub client: ClientConfig,

    /// Login credentials, if both username and password were given
    pub credentials: Option<Credentials>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = if self.client.api_key().is_some() {
            "api-key"
        } else if self.credentials.is_some() {
            "password-grant"
        } else {
            "none"
        };
        let policy = self.client.retry_policy();

        write!(
            f,
            "Config {{ environment: {}, base_url: {}, auth: {}, timeout: {}s, \
             max_retries: {}, backoff_factor: {} }}",
            self.client.environment(),
            self.client.base_url(),
            auth,
            policy.timeout.as_secs_f64(),
            policy.max_retries,
            policy.backoff_factor,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments (including their environment variable fallbacks) take
    /// precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `base_url` is missing or invalid
    /// - The environment name is unknown
    /// - The timeout is zero or the backoff factor is negative or not finite
    /// - Only one of username and password is given
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let environment = Self::resolve_environment(cli, toml)?;
        let base_url = Self::resolve_base_url(cli, toml)?;
        let retry_policy = Self::build_retry_policy(cli, toml)?;

        let mut client = ClientConfig::new(environment, base_url).with_retry_policy(retry_policy);

        let toml_key = toml.and_then(|t| t.client.api_key.as_deref());
        if let Some(key) = pick(cli.api_key.as_deref(), toml_key) {
            client = client.with_api_key(key);
        }
        if let Some(id) = pick(
            cli.client_id.as_deref(),
            toml.and_then(|t| t.oauth.client_id.as_deref()),
        ) {
            client = client.with_client_id(id);
        }
        if let Some(secret) = pick(
            cli.client_secret.as_deref(),
            toml.and_then(|t| t.oauth.client_secret.as_deref()),
        ) {
            client = client.with_client_secret(secret);
        }

        let credentials = Self::resolve_credentials(cli, toml)?;

        Ok(Self {
            client,
            credentials,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_environment(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Environment, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let name = cli
            .environment
            .as_deref()
            .or_else(|| toml.and_then(|t| t.client.environment.as_deref()))
            .unwrap_or(defaults::ENVIRONMENT);

        name.parse::<Environment>()
            .map_err(|_| ConfigError::InvalidEnvironment {
                value: name.to_string(),
            })
    }

    fn resolve_base_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let url_str = cli
            .base_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.client.base_url.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::BASE_URL,
                    "Use --base-url or set client.base_url in config file",
                )
            })?;

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(url)
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let timeout_secs = cli
            .timeout
            .or_else(|| retry.and_then(|r| r.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        let max_retries = cli
            .max_retries
            .or_else(|| retry.and_then(|r| r.max_retries))
            .unwrap_or(defaults::MAX_RETRIES);

        let backoff_factor = cli
            .backoff_factor
            .or_else(|| retry.and_then(|r| r.backoff_factor))
            .unwrap_or(defaults::BACKOFF_FACTOR);

        if timeout_secs == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        if backoff_factor < 0.0 || !backoff_factor.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "backoff_factor must be a non-negative finite number".to_string(),
            ));
        }

        Ok(RetryPolicy::new()
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_max_retries(max_retries)
            .with_backoff_factor(backoff_factor))
    }

    fn resolve_credentials(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<Credentials>, ConfigError> {
        let oauth = toml.map(|t| &t.oauth);
        let username = pick(
            cli.username.as_deref(),
            oauth.and_then(|o| o.username.as_deref()),
        );
        let password = pick(
            cli.password.as_deref(),
            oauth.and_then(|o| o.password.as_deref()),
        );

        match (username, password) {
            (Some(username), Some(password)) => Ok(Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::missing(
                field::PASSWORD,
                "Use --password, PAYGATE_PASSWORD or set oauth.password in config file",
            )),
            (None, Some(_)) => Err(ConfigError::missing(
                field::USERNAME,
                "Use --username, PAYGATE_USERNAME or set oauth.username in config file",
            )),
        }
    }
}

/// Loads the TOML file named by `--config`, if any.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_toml(cli: &Cli) -> Result<Option<TomlConfig>, ConfigError> {
    cli.config
        .as_deref()
        .map(TomlConfig::load)
        .transpose()
}

/// Resolves the webhook secret from the command argument or the config file.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] if neither source has a non-empty secret.
pub fn resolve_webhook_secret(
    arg: Option<&str>,
    toml: Option<&TomlConfig>,
) -> Result<String, ConfigError> {
    pick(arg, toml.and_then(|t| t.webhook.secret.as_deref()))
        .map(str::to_string)
        .ok_or_else(|| {
            ConfigError::missing(
                field::WEBHOOK_SECRET,
                "Use --secret, PAYGATE_WEBHOOK_SECRET or set webhook.secret in config file",
            )
        })
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Returns the first non-empty value, CLI first.
fn pick<'a>(cli: Option<&'a str>, toml: Option<&'a str>) -> Option<&'a str> {
    cli.filter(|s| !s.is_empty())
        .or_else(|| toml.filter(|s| !s.is_empty()))
}
