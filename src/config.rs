use crate::error::{Result, ToolError};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://bds-api.powerloom.io";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset keys fall back to defaults,
    /// malformed ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("SNAPSHOTTER_CORE_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        api_base_url.parse::<url::Url>().map_err(|e| {
            ToolError::ConfigError(format!("Invalid SNAPSHOTTER_CORE_API_URL: {}", e))
        })?;

        let request_timeout = parse_secs(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let connect_timeout = parse_secs(
            &lookup,
            "CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ToolError::ConfigError(format!(
                    "Invalid LOG_FORMAT: {} (expected text or json)",
                    other
                )))
            }
        };

        Ok(Config {
            api_base_url,
            request_timeout,
            connect_timeout,
            log_format,
        })
    }

    pub fn from_url(api_base_url: String) -> Self {
        Config {
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_url(DEFAULT_API_URL.to_string())
    }
}

// Timeouts must be finite and non-zero.
fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(key) {
        None => default,
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ToolError::ConfigError(format!("Invalid {}: {}", key, e)))?,
    };

    if secs == 0 {
        return Err(ToolError::ConfigError(format!(
            "{} must be greater than zero",
            key
        )));
    }

    Ok(Duration::from_secs(secs))
}
