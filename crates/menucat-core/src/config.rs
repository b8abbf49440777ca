use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process. Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("MENUCAT_ENV", "development"))?;
    let data_dir = PathBuf::from(or_default("MENUCAT_DATA_DIR", "./data"));

    let default_currency = or_default("MENUCAT_DEFAULT_CURRENCY", "USD");
    if default_currency.len() != 3 || !default_currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ConfigError::InvalidEnvVar {
            var: "MENUCAT_DEFAULT_CURRENCY".to_string(),
            reason: format!("expected a 3-letter ISO 4217 code, got \"{default_currency}\""),
        });
    }

    let raw_max = or_default("MENUCAT_MAX_BATCH_RECORDS", "10000");
    let max_batch_records =
        raw_max
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "MENUCAT_MAX_BATCH_RECORDS".to_string(),
                reason: e.to_string(),
            })?;
    if max_batch_records == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MENUCAT_MAX_BATCH_RECORDS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        data_dir,
        default_currency,
        max_batch_records,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MENUCAT_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}
