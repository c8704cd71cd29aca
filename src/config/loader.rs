//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{CounterConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Port to listen on; replaces the port of `listener.bind_address`.
pub const ENV_PORT: &str = "PORT";
/// Session cookie name.
pub const ENV_COOKIE_SID: &str = "COOKIE_SID";
/// Origin allowed to make credentialed cross-site calls.
pub const ENV_CORS_ALLOW_ORIGIN: &str = "CORS_ALLOW_ORIGIN";
/// `production` or `development`.
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment, and validate.
///
/// With no path the defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<CounterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => CounterConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut CounterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_PORT) {
        let port: u16 = port.trim().parse().map_err(|e| ConfigError::Env {
            key: ENV_PORT,
            reason: format!("{}", e),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(name) = lookup(ENV_COOKIE_SID) {
        config.session.cookie_name = name;
    }

    if let Some(origin) = lookup(ENV_CORS_ALLOW_ORIGIN) {
        config.cors.allow_origin = Some(origin).filter(|o| !o.trim().is_empty());
    }

    if let Some(env) = lookup(ENV_APP_ENV) {
        config.deployment.environment = env
            .parse::<Environment>()
            .map_err(|reason| ConfigError::Env {
                key: ENV_APP_ENV,
                reason,
            })?;
    }

    Ok(())
}
