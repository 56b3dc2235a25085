//! paygate: payment API client
//!
//! Entry point for the paygate command-line tool.

use paygate::config::{
    ApiCommand, Cli, Command, ValidatedConfig, VerifyWebhookArgs, load_toml, write_default_config,
};
use paygate::transport::ReqwestClient;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, exit_code_for, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let command = match cli.command {
        Command::Init { ref output } => return handle_init(output),
        Command::VerifyWebhook(ref args) => return handle_verify(&cli, args),
        Command::Api(ref command) => command,
    };

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    run_application(command, &config)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the `verify-webhook` subcommand.
fn handle_verify(cli: &Cli, args: &VerifyWebhookArgs) -> ExitCode {
    setup_tracing(cli.verbose);

    let toml = match load_toml(cli) {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    match run::verify_webhook(args, toml.as_ref()) {
        Ok(()) => {
            println!("Signature valid");
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code_for(&e)
        }
    }
}

/// Runs an API command with the production transport.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(command: &ApiCommand, config: &ValidatedConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(command, config, ReqwestClient::new())) {
        Ok(value) => {
            println!("{value:#}");
            exit_code::SUCCESS
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            exit_code_for(&e)
        }
    }
}
