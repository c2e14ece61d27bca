//! Unit tests for API key resolution.
//!
//! These tests mutate process-global env vars and run serially. The test
//! environment is assumed to have no keychain entry for `jules-relay`.

use jules_relay::config::{GlobalConfig, API_KEY_ENV};

#[tokio::test]
#[serial_test::serial]
async fn explicit_key_wins_over_env() {
    std::env::set_var(API_KEY_ENV, "from-env");
    let mut config = GlobalConfig::default();

    config
        .load_credentials(Some("from-flag".into()))
        .await
        .expect("explicit key accepted");
    assert_eq!(config.api.api_key, "from-flag");

    std::env::remove_var(API_KEY_ENV);
}

#[tokio::test]
#[serial_test::serial]
async fn env_var_used_when_no_explicit_key() {
    std::env::set_var(API_KEY_ENV, "from-env");
    let mut config = GlobalConfig::default();

    config.load_credentials(None).await.expect("env key accepted");
    assert_eq!(config.api.api_key, "from-env");

    std::env::remove_var(API_KEY_ENV);
}

#[tokio::test]
#[serial_test::serial]
async fn blank_explicit_key_falls_through_to_env() {
    std::env::set_var(API_KEY_ENV, "from-env");
    let mut config = GlobalConfig::default();

    config
        .load_credentials(Some("   ".into()))
        .await
        .expect("env key accepted");
    assert_eq!(config.api.api_key, "from-env");

    std::env::remove_var(API_KEY_ENV);
}

#[tokio::test]
#[serial_test::serial]
async fn missing_key_error_names_every_source() {
    std::env::remove_var(API_KEY_ENV);
    let mut config = GlobalConfig::default();

    let err = config
        .load_credentials(None)
        .await
        .expect_err("no credential source");
    let msg = err.to_string();
    assert!(msg.starts_with("config:"), "{msg}");
    assert!(msg.contains("--api-key"), "{msg}");
    assert!(msg.contains("keychain"), "{msg}");
    assert!(msg.contains(API_KEY_ENV), "{msg}");
}

#[tokio::test]
#[serial_test::serial]
async fn empty_env_var_is_treated_as_missing() {
    std::env::set_var(API_KEY_ENV, "");
    let mut config = GlobalConfig::default();

    assert!(config.load_credentials(None).await.is_err());

    std::env::remove_var(API_KEY_ENV);
}
