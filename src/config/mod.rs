//! Configuration layer for the `paygate` binary.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Conversion of command arguments into request payloads ([`payload`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **Environment variables** - `PAYGATE_*` credentials, read by clap
//! 3. **TOML config file** - Values from the configuration file
//! 4. **Built-in defaults** - Hardcoded default values
//!
//! `base_url` has no default and must come from the CLI or the config file.
//!
//! # Credentials
//!
//! An API key, when present, is always used for authorization. Username and
//! password are only needed to log in, and must be given together. Empty
//! values count as absent.

mod cli;
pub mod defaults;
mod error;
pub mod payload;
mod toml;
mod validated;


pub use cli::{ApiCommand, Cli, Command, CreatePaymentArgs, RequestArgs, VerifyWebhookArgs};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{
    Credentials, ValidatedConfig, load_toml, resolve_webhook_secret, write_default_config,
};
