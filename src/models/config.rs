//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream release source settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.github.api_token.trim().is_empty() {
            return Err(AppError::validation("github.api_token is not set"));
        }
        if self.github.project.trim().is_empty() {
            return Err(AppError::validation("github.project is empty"));
        }
        if self.github.user_agent.trim().is_empty() {
            return Err(AppError::validation("github.user_agent is empty"));
        }
        if self.github.timeout_secs == 0 {
            return Err(AppError::validation("github.timeout_secs must be > 0"));
        }
        let endpoint = Url::parse(&self.github.endpoint)
            .map_err(|e| AppError::validation(format!("github.endpoint: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AppError::validation(
                "github.endpoint must be an http(s) URL",
            ));
        }
        Ok(())
    }
}

/// GitHub GraphQL source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Bearer token for the GraphQL API
    #[serde(default)]
    pub api_token: String,

    /// Owning organization; the project name is used when unset
    #[serde(default)]
    pub organization: Option<String>,

    /// Repository name, also the prefix of published asset names
    #[serde(default = "defaults::project")]
    pub project: String,

    /// GraphQL endpoint
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl GithubConfig {
    /// Organization to query, falling back to the project name.
    pub fn owner(&self) -> &str {
        self.organization
            .as_deref()
            .filter(|org| !org.trim().is_empty())
            .unwrap_or(&self.project)
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            organization: None,
            project: defaults::project(),
            endpoint: defaults::endpoint(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn project() -> String {
        "Radarr".into()
    }
    pub fn endpoint() -> String {
        "https://api.github.com/graphql".into()
    }
    pub fn user_agent() -> String {
        "ServarrUpdateAPI/1.0.0".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
