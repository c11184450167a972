use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRIES: usize = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

pub const TOKEN_ENV_VAR: &str = "NOTION_TOKEN";

/// Optional on-disk configuration (`.notiontool/config.toml`). The token
/// itself never lives here; it is read from the environment only.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ToolConfig {
    #[serde(default)]
    pub api: ApiSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ApiSection {
    pub url: Option<String>,
    pub version: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ToolConfig {
    /// Resolve the API base URL: env NOTION_API_URL > config > default.
    pub fn api_url(&self) -> String {
        self.api_url_with(env::var("NOTION_API_URL").ok())
    }

    fn api_url_with(&self, env_value: Option<String>) -> String {
        if let Some(value) = nonempty(env_value) {
            return value;
        }
        self.api
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Resolve the API version header: env NOTION_VERSION > config > default.
    pub fn api_version(&self) -> String {
        self.api_version_with(env::var("NOTION_VERSION").ok())
    }

    fn api_version_with(&self, env_value: Option<String>) -> String {
        if let Some(value) = nonempty(env_value) {
            return value;
        }
        self.api
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string())
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms_with(env::var("NOTION_HTTP_TIMEOUT_MS").ok())
    }

    fn timeout_ms_with(&self, env_value: Option<String>) -> u64 {
        env_value
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or_else(|| self.api.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

fn nonempty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Load a ToolConfig from a TOML file. Returns default if the file does
/// not exist.
pub fn load_config(config_path: &Path) -> Result<ToolConfig> {
    if !config_path.exists() {
        return Ok(ToolConfig::default());
    }
    let content = fs::read_to_string(config_path).map_err(|error| {
        Error::Validation(format!("failed to read {}: {error}", config_path.display()))
    })?;
    let parsed: ToolConfig = toml::from_str(&content).map_err(|error| {
        Error::Validation(format!(
            "failed to parse {}: {error}",
            config_path.display()
        ))
    })?;
    Ok(parsed)
}

/// Fully resolved settings for the HTTP client. The token is threaded
/// explicitly from here into the client; nothing reads it ambiently.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: String,
    pub api_version: String,
    pub timeout_ms: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl ClientConfig {
    pub fn from_config(config: &ToolConfig) -> Result<Self> {
        let token = env::var(TOKEN_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::Auth(format!(
                    "{TOKEN_ENV_VAR} is not set. Create an integration token at \
                     https://www.notion.so/my-integrations and export it."
                ))
            })?;

        Ok(Self {
            api_url: config.api_url(),
            token,
            api_version: config.api_version(),
            timeout_ms: config.timeout_ms(),
            max_retries: env_value_usize("NOTION_HTTP_RETRIES", DEFAULT_RETRIES),
            retry_delay_ms: env_value_u64("NOTION_HTTP_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS),
        })
    }
}

fn env_value_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_value_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
