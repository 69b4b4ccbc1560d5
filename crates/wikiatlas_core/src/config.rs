//! Client configuration sourced from the environment.
//!
//! # Responsibility
//! - Load `.env` (when present) and read `WIKIATLAS_*` / Gemini variables.
//! - Reject malformed numeric values instead of silently defaulting.
//!
//! # Invariants
//! - `api_base_url` never ends with a slash.
//! - Durations are strictly positive.

use crate::logging::default_log_level;
use crate::search::gemini::DEFAULT_GEMINI_MODEL;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 10_000;

/// Configuration error for a single variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    NonPositive { key: &'static str },
    InvalidUrl { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "`{key}` must be a non-negative integer, got `{value}`")
            }
            Self::NonPositive { key } => write!(f, "`{key}` must be greater than zero"),
            Self::InvalidUrl { key, value } => {
                write!(f, "`{key}` must be an http(s) url, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Runtime configuration for gateway, search and auto-save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin; endpoints live under `/api`.
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Quiet period before an auto-save fires.
    pub autosave_delay: Duration,
    /// SQLite offline archive; in-memory when `None`.
    pub archive_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; file logging is off when `None`.
    pub log_dir: Option<PathBuf>,
    /// Semantic search is disabled when `None`.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            archive_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, used by tests to avoid touching
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_base_url = match read("WIKIATLAS_API_BASE_URL") {
            Some(value) => normalize_base_url("WIKIATLAS_API_BASE_URL", &value)?,
            None => defaults.api_base_url,
        };
        let request_timeout = match read("WIKIATLAS_REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_positive(
                "WIKIATLAS_REQUEST_TIMEOUT_SECS",
                &value,
            )?),
            None => defaults.request_timeout,
        };
        let autosave_delay = match read("WIKIATLAS_AUTOSAVE_DELAY_MS") {
            Some(value) => {
                Duration::from_millis(parse_positive("WIKIATLAS_AUTOSAVE_DELAY_MS", &value)?)
            }
            None => defaults.autosave_delay,
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            autosave_delay,
            archive_path: read("WIKIATLAS_ARCHIVE_PATH").map(PathBuf::from),
            log_level: read("WIKIATLAS_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: read("WIKIATLAS_LOG_DIR").map(PathBuf::from),
            gemini_api_key: read("GEMINI_API_KEY").or_else(|| read("API_KEY")),
            gemini_model: read("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
        })
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    let parsed = value.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })?;
    if parsed == 0 {
        return Err(ConfigError::NonPositive { key });
    }
    Ok(parsed)
}

fn normalize_base_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ClientConfig::from_lookup(|_| None).expect("defaults are valid");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.autosave_delay, Duration::from_secs(10));
    }

    #[test]
    fn values_are_read_and_normalized() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("WIKIATLAS_API_BASE_URL", "https://atlas.example/ "),
            ("WIKIATLAS_AUTOSAVE_DELAY_MS", "2500"),
            ("API_KEY", "fallback-key"),
            ("WIKIATLAS_ARCHIVE_PATH", "/tmp/atlas.sqlite3"),
        ]))
        .expect("valid config");
        assert_eq!(config.api_base_url, "https://atlas.example");
        assert_eq!(config.autosave_delay, Duration::from_millis(2500));
        assert_eq!(config.gemini_api_key.as_deref(), Some("fallback-key"));
        assert_eq!(
            config.archive_path,
            Some(PathBuf::from("/tmp/atlas.sqlite3"))
        );
    }

    #[test]
    fn gemini_key_takes_precedence_over_generic_key() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "gemini"),
            ("API_KEY", "generic"),
        ]))
        .expect("valid config");
        assert_eq!(config.gemini_api_key.as_deref(), Some("gemini"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(
            "WIKIATLAS_REQUEST_TIMEOUT_SECS",
            "soon",
        )]))
        .expect_err("non-numeric timeout");
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));

        let err = ClientConfig::from_lookup(lookup_from(&[("WIKIATLAS_AUTOSAVE_DELAY_MS", "0")]))
            .expect_err("zero delay");
        assert_eq!(
            err,
            ConfigError::NonPositive {
                key: "WIKIATLAS_AUTOSAVE_DELAY_MS"
            }
        );

        let err = ClientConfig::from_lookup(lookup_from(&[("WIKIATLAS_API_BASE_URL", "atlas")]))
            .expect_err("no scheme");
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
