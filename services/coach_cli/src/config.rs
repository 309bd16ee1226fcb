//! services/coach_cli/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    /// Opaque bearer token. Without one every conversation call fails as unauthorized.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    /// Days of health data sent per message; `None` sends all of it.
    pub health_window_days: Option<usize>,
    pub health_csv: Option<PathBuf>,
    pub workout_csv: Option<PathBuf>,
    /// JSON file with the workout library; the built-in library is used otherwise.
    pub workout_library: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Backend ---
        let api_base_url =
            var("COACH_API_BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "COACH_API_BASE_URL".to_string(),
                format!("'{}' must start with http:// or https://", api_base_url),
            ));
        }

        let auth_token = var("COACH_AUTH_TOKEN");

        let timeout_secs = parse_number(&var, "COACH_REQUEST_TIMEOUT_SECS", 60)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "COACH_REQUEST_TIMEOUT_SECS".to_string(),
                "timeout must be at least one second".to_string(),
            ));
        }

        let window = parse_number(&var, "COACH_HEALTH_WINDOW_DAYS", 7)?;
        let health_window_days = (window > 0).then_some(window as usize);

        // --- Data Files ---
        let health_csv = var("COACH_HEALTH_CSV").map(PathBuf::from);
        let workout_csv = var("COACH_WORKOUT_CSV").map(PathBuf::from);
        let workout_library = var("COACH_WORKOUT_LIBRARY").map(PathBuf::from);

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            auth_token,
            request_timeout: Duration::from_secs(timeout_secs),
            health_window_days,
            health_csv,
            workout_csv,
            workout_library,
            log_level,
        })
    }
}

fn parse_number<F>(var: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), format!("'{}' is not a whole number", raw))
        }),
    }
}
