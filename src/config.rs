use std::{env, time::Duration};

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CLIENT_NAME: &str = "AI Workflow Agent";
pub const DEFAULT_CLIENT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: Url,
    pub health_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub client_name: String,
    pub client_version: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GLSP_MCP_URL must be an absolute http(s) URL: {0}")]
    InvalidServerUrl(String),
    #[error("{name} must be a positive number of seconds")]
    InvalidTimeout { name: &'static str },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server url is valid"),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            request_timeout: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_url = match read("GLSP_MCP_URL") {
            Some(raw) => parse_server_url(&raw)?,
            None => parse_server_url(DEFAULT_SERVER_URL)?,
        };

        let health_timeout = read("GLSP_MCP_HEALTH_TIMEOUT_SECS")
            .map(|value| parse_timeout("GLSP_MCP_HEALTH_TIMEOUT_SECS", &value))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS));

        let request_timeout = read("GLSP_MCP_REQUEST_TIMEOUT_SECS")
            .map(|value| parse_timeout("GLSP_MCP_REQUEST_TIMEOUT_SECS", &value))
            .transpose()?;

        let client_name =
            read("GLSP_MCP_CLIENT_NAME").unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());

        Ok(Self {
            server_url,
            health_timeout,
            request_timeout,
            client_name,
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
        })
    }

    pub fn with_server_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.server_url = parse_server_url(raw)?;
        Ok(self)
    }

    /// Base URL rendered without a trailing slash, as shown to users.
    pub fn display_url(&self) -> String {
        self.server_url.as_str().trim_end_matches('/').to_string()
    }
}

pub fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidServerUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidServerUrl(raw.to_string()));
    }
    Ok(url)
}

fn parse_timeout(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { name }),
    }
}
