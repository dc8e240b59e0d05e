// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::GithubConfig;

/// Create an HTTP client that authenticates every request with the API token.
pub fn create_async_client(config: &GithubConfig) -> Result<reqwest::Client> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
        .map_err(|e| AppError::config(format!("github.api_token is not a valid header: {e}")))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// First `max_chars` of a response body, for error messages.
pub fn body_snippet(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
