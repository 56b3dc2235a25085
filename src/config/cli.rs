//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// paygate: payment API client
///
/// Creates payments, queries transactions and verifies webhook
/// signatures against a remote payment-processing API.
#[derive(Debug, Parser)]
#[command(name = "paygate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Deployment environment: uat or live
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Base URL of the payment API
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Static API key sent as a bearer credential
    #[arg(long = "api-key", global = true, env = "PAYGATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OAuth client id
    #[arg(long = "client-id", global = true, env = "PAYGATE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(
        long = "client-secret",
        global = true,
        env = "PAYGATE_CLIENT_SECRET",
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Username for the password grant
    #[arg(long, global = true, env = "PAYGATE_USERNAME")]
    pub username: Option<String>,

    /// Password for the password grant
    #[arg(long, global = true, env = "PAYGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Number of retries after the first attempt
    #[arg(long = "max-retries", global = true)]
    pub max_retries: Option<u32>,

    /// Backoff factor in seconds (delay before retry n is factor * 2^(n-1))
    #[arg(long = "backoff-factor", global = true)]
    pub backoff_factor: Option<f64>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for paygate
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Verify a webhook signature against a payload file
    VerifyWebhook(VerifyWebhookArgs),

    #[command(flatten)]
    Api(ApiCommand),
}

/// Subcommands that talk to the payment API.
#[derive(Debug, Subcommand)]
pub enum ApiCommand {
    /// Log in with the password grant and print the token expiry
    Login,

    /// Create a payment
    CreatePayment(CreatePaymentArgs),

    /// Query the status of a payment
    Status {
        /// Merchant order id of the payment
        #[arg(long = "order-id")]
        order_id: String,
    },

    /// List transactions
    List {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Send an arbitrary request with the configured credentials
    Request(RequestArgs),
}

/// Arguments for `create-payment`.
#[derive(Debug, Args)]
pub struct CreatePaymentArgs {
    /// Amount in minor units
    #[arg(long)]
    pub amount: u64,

    /// Merchant order id
    #[arg(long = "order-id")]
    pub order_id: String,

    /// Payment channel
    #[arg(long)]
    pub channel: String,

    /// Purpose shown to the customer
    #[arg(long)]
    pub purpose: String,

    /// Customer name
    #[arg(long = "customer-name")]
    pub customer_name: Option<String>,

    /// Customer email
    #[arg(long = "customer-email")]
    pub customer_email: Option<String>,

    /// Customer phone number
    #[arg(long = "customer-phone")]
    pub customer_phone: Option<String>,

    /// Seconds until the payment expires
    #[arg(long = "expires-in")]
    pub expires_in: Option<u64>,

    /// Extra metadata as a JSON value
    #[arg(long, value_name = "JSON")]
    pub metadata: Option<String>,

    /// Opaque idempotency key passed to the service
    #[arg(long = "idempotency-key")]
    pub idempotency_key: Option<String>,
}

/// Arguments for `request`.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Path relative to the base URL, or an absolute URL
    #[arg(long)]
    pub path: String,

    /// JSON request body
    #[arg(long, value_name = "JSON", conflicts_with = "form")]
    pub json: Option<String>,

    /// Form field in 'Key=Value' format (can be specified multiple times)
    #[arg(long, value_name = "K=V")]
    pub form: Vec<String>,

    /// HTTP header in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V")]
    pub headers: Vec<String>,
}

/// Arguments for `verify-webhook`.
#[derive(Debug, Args)]
pub struct VerifyWebhookArgs {
    /// File holding the raw webhook body
    #[arg(long)]
    pub payload: PathBuf,

    /// Value of the X-Signature header
    #[arg(long)]
    pub signature: String,

    /// Shared webhook secret
    #[arg(long, env = "PAYGATE_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning clap's error on failure.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown or malformed arguments.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }

    /// Returns true if the command talks to the payment API.
    #[must_use]
    pub const fn needs_client(&self) -> bool {
        matches!(self.command, Command::Api(_))
    }
}
