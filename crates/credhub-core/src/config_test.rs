use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert(
        "CREDHUB_STORAGE_BASE_URL",
        "https://storage.example.com/v0/b/bucket",
    );
    m.insert("CREDHUB_RECORDS_BASE_URL", "https://records.example.com/v1");
    m.insert("CREDHUB_WEBHOOK_URL", "https://hooks.example.com/credit-score");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(parse_environment("development"), Environment::Development);
}

#[test]
fn parse_environment_production() {
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_storage_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CREDHUB_STORAGE_BASE_URL"),
        "expected MissingEnvVar(CREDHUB_STORAGE_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_webhook_url() {
    let mut map = full_env();
    map.remove("CREDHUB_WEBHOOK_URL");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CREDHUB_WEBHOOK_URL"),
        "expected MissingEnvVar(CREDHUB_WEBHOOK_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.storage_token.is_none());
    assert_eq!(cfg.http_timeout_secs, 120);
    assert!(cfg.income_webhook_url.is_none());
    assert_eq!(cfg.user_agent, "credhub/0.1 (credit-analysis)");
    assert_eq!(cfg.upload.max_file_size, 10 * 1024 * 1024);
    assert_eq!(cfg.upload.max_retries, 3);
    assert_eq!(cfg.upload.retry_delay, Duration::from_millis(1000));
    assert!(cfg
        .upload
        .allowed_types
        .iter()
        .any(|t| t == "application/pdf"));
}

#[test]
fn build_app_config_reads_upload_overrides() {
    let mut map = full_env();
    map.insert("CREDHUB_UPLOAD_MAX_FILE_SIZE_BYTES", "5242880");
    map.insert("CREDHUB_UPLOAD_MAX_RETRIES", "5");
    map.insert("CREDHUB_UPLOAD_RETRY_DELAY_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.upload.max_file_size, 5 * 1024 * 1024);
    assert_eq!(cfg.upload.max_retries, 5);
    assert_eq!(cfg.upload.retry_delay, Duration::from_millis(250));
}

#[test]
fn build_app_config_rejects_zero_retries() {
    let mut map = full_env();
    map.insert("CREDHUB_UPLOAD_MAX_RETRIES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CREDHUB_UPLOAD_MAX_RETRIES"),
        "expected InvalidEnvVar(CREDHUB_UPLOAD_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = full_env();
    map.insert("CREDHUB_HTTP_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CREDHUB_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(CREDHUB_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn empty_storage_token_is_treated_as_absent() {
    let mut map = full_env();
    map.insert("CREDHUB_STORAGE_TOKEN", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.storage_token.is_none());
}

#[test]
fn debug_output_redacts_storage_token() {
    let mut map = full_env();
    map.insert("CREDHUB_STORAGE_TOKEN", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn build_app_config_reads_income_webhook_url() {
    let mut map = full_env();
    map.insert(
        "CREDHUB_INCOME_WEBHOOK_URL",
        "https://hooks.example.com/renda-presumida",
    );
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.income_webhook_url.as_deref(),
        Some("https://hooks.example.com/renda-presumida")
    );
}
