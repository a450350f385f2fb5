use std::{env, time::Duration};

use thiserror::Error;

const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_OCR_DELAY_MS: u64 = 1000;
const DEV_JWT_SECRET: &str = "expensehub-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base of the expense backend, without a trailing slash.
    pub api_base: String,
    pub jwt_secret: String,
    /// When set, every backend call uses this bearer instead of the
    /// session user's token.
    pub static_api_token: Option<String>,
    pub ocr_delay: Duration,
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            static_api_token: None,
            ocr_delay: Duration::from_millis(DEFAULT_OCR_DELAY_MS),
            static_dir: "static".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup so it can be driven without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name: "PORT", value })?,
            None => defaults.port,
        };

        let api_base = match lookup("EXPENSEHUB_API_BASE") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::Empty { name: "EXPENSEHUB_API_BASE" })
            }
            Some(value) => value.trim().trim_end_matches('/').to_string(),
            None => defaults.api_base,
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(value) if value.is_empty() => return Err(ConfigError::Empty { name: "JWT_SECRET" }),
            Some(value) => value,
            None => {
                log::warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };

        let static_api_token = lookup("EXPENSEHUB_API_TOKEN").filter(|t| !t.trim().is_empty());

        let ocr_delay = match lookup("OCR_DELAY_MS") {
            Some(value) => Duration::from_millis(
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { name: "OCR_DELAY_MS", value })?,
            ),
            None => defaults.ocr_delay,
        };

        let static_dir = lookup("STATIC_DIR").unwrap_or(defaults.static_dir);

        Ok(Self {
            port,
            api_base,
            jwt_secret,
            static_api_token,
            ocr_delay,
            static_dir,
        })
    }
}
