//! Tests for `ClientConfig`.

use super::{ClientConfig, Environment};
use crate::error::Error;
use std::time::Duration;
use url::Url;

fn config(env: Environment) -> ClientConfig {
    ClientConfig::new(env, Url::parse("https://pay.example.com").unwrap())
}

#[test]
fn new_has_no_credentials() {
    let config = config(Environment::Uat);

    assert!(config.api_key().is_none());
    assert!(config.client_id().is_none());
    assert!(!config.has_oauth());
}

#[test]
fn empty_api_key_is_ignored() {
    let config = config(Environment::Uat).with_api_key("");

    assert!(config.api_key().is_none());
}

#[test]
fn retry_setters_update_policy() {
    let config = config(Environment::Uat)
        .with_timeout(Duration::from_secs(7))
        .with_max_retries(1)
        .with_backoff_factor(2.0);

    let policy = config.retry_policy();
    assert_eq!(policy.timeout, Duration::from_secs(7));
    assert_eq!(policy.max_retries, 1);
    assert!((policy.backoff_factor - 2.0).abs() < f64::EPSILON);
}

#[test]
fn oauth_requires_both_values() {
    let id_only = config(Environment::Uat).with_client_id("id");
    let secret_only = config(Environment::Uat).with_client_secret("secret");
    let empty_secret = config(Environment::Uat).with_oauth("id", "");

    assert!(matches!(
        id_only.oauth_credentials(),
        Err(Error::Configuration(msg)) if msg.contains("client_secret")
    ));
    assert!(matches!(
        secret_only.oauth_credentials(),
        Err(Error::Configuration(msg)) if msg.contains("client_id")
    ));
    assert!(!empty_secret.has_oauth());
}

#[test]
fn oauth_credentials_returned_when_complete() {
    let config = config(Environment::Uat).with_oauth("id", "secret");

    assert_eq!(config.oauth_credentials().unwrap(), ("id", "secret"));
}

#[test]
fn scoped_path_uses_environment_prefix() {
    assert_eq!(config(Environment::Uat).scoped_path("login"), "/uat_mode/login");
    assert_eq!(
        config(Environment::Live).scoped_path("/transaction-list"),
        "/live/transaction-list"
    );
}

#[test]
fn debug_redacts_secrets() {
    let config = config(Environment::Live)
        .with_api_key("key-123")
        .with_oauth("id", "secret-456");
    let debug = format!("{config:?}");

    assert!(!debug.contains("key-123"));
    assert!(!debug.contains("secret-456"));
    assert!(debug.contains("Live"));
}
