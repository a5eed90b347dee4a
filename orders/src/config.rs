//! Configuration management for the admin console.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Call `dotenvy::dotenv()` first to pick up a local `.env` file.

use crate::pagination::DEFAULT_PAGE_SIZE;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Stores the console can be pointed at, by code and display label
const KNOWN_STORES: [(&str, &str); 1] = [("MDP", "CAR SHED")];

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be used
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Value as set
        value: String,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// The store whose orders the console manages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    /// Store code, e.g. `MDP`
    pub code: String,
    /// Display label, e.g. `CAR SHED`
    pub label: String,
}

impl StoreLocation {
    /// Location for `code`, labelled from the known stores (or by its code)
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let label = KNOWN_STORES
            .iter()
            .find(|(known, _)| *known == code)
            .map_or_else(|| code.clone(), |(_, label)| (*label).to_string());
        Self { code, label }
    }
}

impl Default for StoreLocation {
    fn default() -> Self {
        Self::from_code(KNOWN_STORES[0].0)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Admin API base URL (`TP_ADMIN_API_URL`)
    pub api_url: String,
    /// Orders per page (`TP_ADMIN_PAGE_SIZE`)
    pub page_size: usize,
    /// Upper bound on every API call (`TP_ADMIN_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Duration,
    /// Store shown in the header (`TP_ADMIN_STORE`)
    pub store: StoreLocation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(10),
            store: StoreLocation::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (variable name → value)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("TP_ADMIN_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let page_size = match lookup("TP_ADMIN_PAGE_SIZE") {
            Some(value) => parse_positive("TP_ADMIN_PAGE_SIZE", &value)?,
            None => defaults.page_size,
        };

        let request_timeout = match lookup("TP_ADMIN_REQUEST_TIMEOUT_SECS") {
            Some(value) => {
                Duration::from_secs(parse_positive("TP_ADMIN_REQUEST_TIMEOUT_SECS", &value)?)
            },
            None => defaults.request_timeout,
        };

        let store = lookup("TP_ADMIN_STORE")
            .filter(|code| !code.trim().is_empty())
            .map_or(defaults.store, |code| StoreLocation::from_code(&code));

        Ok(Self {
            api_url,
            page_size,
            request_timeout,
            store,
        })
    }
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n == T::default() => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero",
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "not a whole number",
        }),
    }
}
