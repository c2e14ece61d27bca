//! Unit tests for TOML configuration parsing and validation.

use std::time::Duration;

use jules_relay::{config::GlobalConfig, AppError};

fn sample_toml() -> &'static str {
    r#"
[api]
base_url = "http://127.0.0.1:8080/"
api_version = "v1beta"
request_timeout_seconds = 15
user_agent = "relay-test"

[monitor]
interval_seconds = 5
timeout_seconds = 120

[paging]
sources_page_size = 50
sessions_page_size = 25
activities_page_size = 5
"#
}

#[test]
fn parses_full_config() {
    let config = GlobalConfig::from_toml_str(sample_toml()).expect("config parses");
    assert_eq!(config.api.endpoint(), "http://127.0.0.1:8080/v1beta");
    assert_eq!(config.api.request_timeout(), Duration::from_secs(15));
    assert_eq!(config.api.user_agent, "relay-test");
    assert_eq!(config.monitor_interval(), Duration::from_secs(5));
    assert_eq!(config.monitor_timeout(), Duration::from_secs(120));
    assert_eq!(config.paging.sources_page_size, 50);
    assert_eq!(config.paging.sessions_page_size, 25);
    assert_eq!(config.paging.activities_page_size, 5);
}

#[test]
fn empty_config_uses_defaults() {
    let config = GlobalConfig::from_toml_str("").expect("empty config parses");
    assert_eq!(config, GlobalConfig::default());
    assert_eq!(config.api.endpoint(), "https://jules.googleapis.com/v1alpha");
    assert_eq!(config.monitor_interval(), Duration::from_secs(30));
    assert_eq!(config.monitor_timeout(), Duration::from_secs(3600));
    assert_eq!(config.paging.sources_page_size, 10);
    assert_eq!(config.paging.sessions_page_size, 10);
    assert_eq!(config.paging.activities_page_size, 30);
    assert!(config.api.api_key.is_empty());
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = GlobalConfig::from_toml_str("[monitor]\ninterval_seconds = 2\n")
        .expect("partial config parses");
    assert_eq!(config.monitor_interval(), Duration::from_secs(2));
    assert_eq!(config.monitor_timeout(), Duration::from_secs(3600));
}

#[test]
fn api_key_is_never_read_from_file() {
    let config = GlobalConfig::from_toml_str("[api]\napi_key = \"leaked\"\n")
        .expect("unknown key is ignored");
    assert!(config.api.api_key.is_empty());
}

#[test]
fn rejects_zero_interval() {
    let result = GlobalConfig::from_toml_str("[monitor]\ninterval_seconds = 0\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_zero_page_size() {
    let result = GlobalConfig::from_toml_str("[paging]\nactivities_page_size = 0\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_non_http_base_url() {
    let err = GlobalConfig::from_toml_str("[api]\nbase_url = \"ftp://example.com\"\n")
        .expect_err("ftp is rejected");
    assert!(err.to_string().contains("base_url"), "{err}");
}

#[test]
fn rejects_invalid_toml() {
    let err = GlobalConfig::from_toml_str("[monitor\n").expect_err("syntax error");
    assert!(err.to_string().starts_with("config: invalid config:"), "{err}");
}

#[test]
fn loads_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("config.toml");
    std::fs::write(&path, sample_toml()).expect("write config");

    let config = GlobalConfig::load_from_path(&path).expect("config loads");
    assert_eq!(config.paging.sessions_page_size, 25);
}

#[test]
fn missing_file_is_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = GlobalConfig::load_from_path(temp.path().join("absent.toml"));
    assert!(matches!(result, Err(AppError::Config(_))));
}
