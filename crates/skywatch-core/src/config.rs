use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_ASTRO_API_BASE_URL: &str = "https://api.astronomyapi.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values are treated as unset so `.env` templates with blank
    // credentials do not enable half-configured auth.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("SKYWATCH_ENV", "development"))?;
    let bind_addr = parse_var(&lookup, "SKYWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SKYWATCH_LOG_LEVEL", "info");
    let display_limit: usize = parse_var(&lookup, "SKYWATCH_DISPLAY_LIMIT", "200")?;
    if display_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SKYWATCH_DISPLAY_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let astro_api_base_url = or_default("ASTRO_API_BASE_URL", DEFAULT_ASTRO_API_BASE_URL);
    let astro_app_id = optional("ASTRO_APP_ID");
    let astro_app_secret = optional("ASTRO_APP_SECRET");
    let astro_request_timeout_secs: u64 =
        parse_var(&lookup, "ASTRO_REQUEST_TIMEOUT_SECS", "120")?;
    if astro_request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ASTRO_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let astro_user_agent = or_default("ASTRO_USER_AGENT", "skywatch/0.1 (astronomy-events)");
    let astro_default_lat = parse_var(&lookup, "ASTRO_DEFAULT_LAT", "55.7558")?;
    let astro_default_lon = parse_var(&lookup, "ASTRO_DEFAULT_LON", "37.6173")?;
    let astro_default_days = parse_var(&lookup, "ASTRO_DEFAULT_DAYS", "7")?;
    let astro_default_body = or_default("ASTRO_DEFAULT_BODY", "sun");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        display_limit,
        astro_api_base_url,
        astro_app_id,
        astro_app_secret,
        astro_request_timeout_secs,
        astro_user_agent,
        astro_default_lat,
        astro_default_lon,
        astro_default_days,
        astro_default_body,
    })
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SKYWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
