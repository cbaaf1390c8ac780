use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_OVERPASS_ENDPOINTS: &str = "https://overpass-api.de/api/interpreter,\
https://overpass.kumi.systems/api/interpreter,\
https://lz4.overpass-api.de/api/interpreter";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
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
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so parsing can be tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got {other:?}"))),
        }
    };

    let env = parse_environment(&or_default("SPOTFINDER_ENV", "development"))?;
    let log_level = or_default("SPOTFINDER_LOG_LEVEL", "info");

    let overpass_endpoints: Vec<String> =
        or_default("SPOTFINDER_OVERPASS_ENDPOINTS", DEFAULT_OVERPASS_ENDPOINTS)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    if overpass_endpoints.is_empty() {
        return Err(invalid(
            "SPOTFINDER_OVERPASS_ENDPOINTS",
            "at least one endpoint is required".to_string(),
        ));
    }

    let overpass_timeout_secs = parse_u64("SPOTFINDER_OVERPASS_TIMEOUT_SECS", "12")?;
    let osrm_base_url = or_default("SPOTFINDER_OSRM_BASE_URL", "https://router.project-osrm.org");
    let osrm_timeout_secs = parse_u64("SPOTFINDER_OSRM_TIMEOUT_SECS", "15")?;
    let refine_travel_times = parse_bool("SPOTFINDER_REFINE_TRAVEL_TIMES", "true")?;
    let user_agent = or_default("SPOTFINDER_USER_AGENT", "spotfinder/0.1 (poi-discovery)");
    let favorites_path = PathBuf::from(or_default(
        "SPOTFINDER_FAVORITES_PATH",
        "./data/favorites.json",
    ));
    let name_language = or_default("SPOTFINDER_NAME_LANGUAGE", "ja");
    let secondary_language = or_default("SPOTFINDER_SECONDARY_LANGUAGE", "en");
    let thumbnail_limit = parse_usize("SPOTFINDER_THUMBNAIL_LIMIT", "12")?;

    Ok(AppConfig {
        env,
        log_level,
        overpass_endpoints,
        overpass_timeout_secs,
        osrm_base_url,
        osrm_timeout_secs,
        refine_travel_times,
        user_agent,
        favorites_path,
        name_language,
        secondary_language,
        thumbnail_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SPOTFINDER_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
