use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config with insights disabled.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("MEDINTEL_ENV", "development"))?;

    let bind_addr = parse_addr("MEDINTEL_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MEDINTEL_LOG_LEVEL", "info");
    let max_upload_bytes = parse_usize("MEDINTEL_MAX_UPLOAD_BYTES", "52428800")?;

    // An empty key is treated the same as an unset one.
    let gemini_api_key = lookup("GEMINI_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let gemini_model = or_default("MEDINTEL_GEMINI_MODEL", "gemini-2.0-flash");
    let gemini_base_url = or_default(
        "MEDINTEL_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );

    let insight_timeout_secs = parse_u64("MEDINTEL_INSIGHT_TIMEOUT_SECS", "30")?;
    let insight_max_retries = parse_u32("MEDINTEL_INSIGHT_MAX_RETRIES", "2")?;
    let insight_backoff_base_ms = parse_u64("MEDINTEL_INSIGHT_BACKOFF_BASE_MS", "500")?;

    if insight_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MEDINTEL_INSIGHT_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        max_upload_bytes,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        insight_timeout_secs,
        insight_max_retries,
        insight_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MEDINTEL_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
