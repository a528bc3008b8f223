use std::time::Duration;

use crate::app_config::{AppConfig, Environment};
use crate::upload::UploadConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let storage_base_url = require("CREDHUB_STORAGE_BASE_URL")?;
    let records_base_url = require("CREDHUB_RECORDS_BASE_URL")?;
    let webhook_url = require("CREDHUB_WEBHOOK_URL")?;
    let income_webhook_url = lookup("CREDHUB_INCOME_WEBHOOK_URL")
        .ok()
        .filter(|u| !u.is_empty());

    let env = parse_environment(&or_default("CREDHUB_ENV", "development"));
    let log_level = or_default("CREDHUB_LOG_LEVEL", "info");
    let storage_token = lookup("CREDHUB_STORAGE_TOKEN")
        .ok()
        .filter(|t| !t.is_empty());

    let http_timeout_secs = parse_u64("CREDHUB_HTTP_TIMEOUT_SECS", "120")?;
    let user_agent = or_default("CREDHUB_USER_AGENT", "credhub/0.1 (credit-analysis)");

    let defaults = UploadConfig::default();
    let max_file_size = parse_u64(
        "CREDHUB_UPLOAD_MAX_FILE_SIZE_BYTES",
        &defaults.max_file_size.to_string(),
    )?;
    let max_retries = parse_u32(
        "CREDHUB_UPLOAD_MAX_RETRIES",
        &defaults.max_retries.to_string(),
    )?;
    if max_retries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CREDHUB_UPLOAD_MAX_RETRIES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_delay_ms = parse_u64("CREDHUB_UPLOAD_RETRY_DELAY_MS", "1000")?;

    Ok(AppConfig {
        env,
        log_level,
        storage_base_url,
        storage_token,
        records_base_url,
        webhook_url,
        income_webhook_url,
        http_timeout_secs,
        user_agent,
        upload: UploadConfig {
            max_file_size,
            max_retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
            allowed_types: defaults.allowed_types,
        },
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
