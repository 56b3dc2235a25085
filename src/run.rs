//! Command execution.
//!
//! Turns a parsed subcommand into calls on [`PaymentClient`] and returns the
//! JSON document to print.

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use serde_json::{Value, json};
use thiserror::Error;

use paygate::Error;
use paygate::client::PaymentClient;
use paygate::config::{
    ApiCommand, ConfigError, TomlConfig, ValidatedConfig, VerifyWebhookArgs, defaults, field,
    payload, resolve_webhook_secret,
};
use paygate::time::{Clock, Sleeper};
use paygate::transport::HttpClient;
use paygate::webhook::verify_signature;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Invalid command arguments or configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The payment API call failed.
    #[error(transparent)]
    Api(#[from] Error),

    /// Failed to read the webhook payload file.
    #[error("Failed to read payload '{}': {source}", path.display())]
    PayloadRead {
        /// Path to the payload file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The webhook signature does not match the payload.
    #[error("Webhook signature verification failed")]
    InvalidSignature,
}

/// Executes an API subcommand against the given transport.
///
/// When no API key is configured but username and password are, a login
/// runs first so the command is sent with a bearer token.
///
/// # Errors
///
/// Returns [`RunError::Config`] for invalid arguments or missing credentials,
/// and [`RunError::Api`] for any failed API call.
pub async fn execute<H: HttpClient>(
    command: &ApiCommand,
    config: &ValidatedConfig,
    transport: H,
) -> Result<Value, RunError> {
    let client = PaymentClient::new(config.client.clone(), transport);
    execute_with(command, config, &client).await
}

async fn execute_with<H, S, C>(
    command: &ApiCommand,
    config: &ValidatedConfig,
    client: &PaymentClient<H, S, C>,
) -> Result<Value, RunError>
where
    H: HttpClient,
    S: Sleeper,
    C: Clock,
{
    if !matches!(command, ApiCommand::Login) {
        authenticate(config, client).await?;
    }

    let value = match command {
        ApiCommand::Login => login(config, client).await?,
        ApiCommand::CreatePayment(args) => {
            let payment = payload::create_payment(args)?;
            client
                .create_payment(&payment, args.idempotency_key.as_deref())
                .await?
        }
        ApiCommand::Status { order_id } => client.transaction_status(order_id).await?,
        ApiCommand::List { limit, page } => {
            client
                .transaction_list(
                    limit.unwrap_or(defaults::LIST_LIMIT),
                    page.unwrap_or(defaults::LIST_PAGE),
                )
                .await?
        }
        ApiCommand::Request(args) => client.request(payload::request_spec(args)?).await?,
    };

    Ok(value)
}

/// Logs in and reports when the token expires. The token itself is not printed.
async fn login<H, S, C>(
    config: &ValidatedConfig,
    client: &PaymentClient<H, S, C>,
) -> Result<Value, RunError>
where
    H: HttpClient,
    S: Sleeper,
    C: Clock,
{
    let credentials = config.credentials.as_ref().ok_or_else(|| {
        ConfigError::missing(
            field::USERNAME,
            "Use --username/--password, PAYGATE_USERNAME/PAYGATE_PASSWORD or the [oauth] section",
        )
    })?;

    let token = client
        .login(&credentials.username, &credentials.password)
        .await?;

    let expires_at = token
        .expires_at()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());

    Ok(json!({
        "authenticated": true,
        "expires_at": expires_at,
    }))
}

/// Logs in first when only password-grant credentials are configured.
async fn authenticate<H, S, C>(
    config: &ValidatedConfig,
    client: &PaymentClient<H, S, C>,
) -> Result<(), RunError>
where
    H: HttpClient,
    S: Sleeper,
    C: Clock,
{
    if config.client.api_key().is_some() {
        return Ok(());
    }

    match config.credentials {
        Some(ref credentials) => {
            client
                .login(&credentials.username, &credentials.password)
                .await?;
        }
        None => tracing::debug!("No API key or login credentials configured"),
    }

    Ok(())
}

/// Verifies a webhook payload file against a signature.
///
/// # Errors
///
/// Returns [`RunError::PayloadRead`] if the file cannot be read,
/// [`RunError::Config`] if no secret is configured, and
/// [`RunError::InvalidSignature`] if verification fails.
pub fn verify_webhook(
    args: &VerifyWebhookArgs,
    toml: Option<&TomlConfig>,
) -> Result<(), RunError> {
    let secret = resolve_webhook_secret(args.secret.as_deref(), toml)?;

    let payload = std::fs::read(&args.payload).map_err(|e| RunError::PayloadRead {
        path: args.payload.clone(),
        source: e,
    })?;

    if verify_signature(&payload, Some(&args.signature), &secret) {
        tracing::debug!(bytes = payload.len(), "Webhook signature verified");
        Ok(())
    } else {
        Err(RunError::InvalidSignature)
    }
}
