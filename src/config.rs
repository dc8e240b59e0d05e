// src/config.rs

//! Configuration loading utilities.
//!
//! The TOML file supplies defaults; a few environment variables override it
//! so the API token never has to live on disk.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Overrides `github.api_token`.
pub const ENV_API_TOKEN: &str = "GITHUB_API_TOKEN";
/// Overrides `github.organization`.
pub const ENV_ORGANIZATION: &str = "GITHUB_ORG";
/// Overrides `github.project`.
pub const ENV_PROJECT: &str = "GITHUB_PROJECT";

/// Load configuration from a TOML file and apply environment overrides.
///
/// Nothing is logged here; callers report a failed load once logging is up
/// and can continue with [`fallback_config`].
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Default configuration with environment overrides applied.
pub fn fallback_config() -> Config {
    let mut config = Config::default();
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply overrides from `lookup`, ignoring unset or blank values.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = value(ENV_API_TOKEN) {
        config.github.api_token = token;
    }
    if let Some(org) = value(ENV_ORGANIZATION) {
        config.github.organization = Some(org);
    }
    if let Some(project) = value(ENV_PROJECT) {
        config.github.project = project;
    }
}
