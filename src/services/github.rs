// src/services/github.rs

//! Release source backed by the GitHub GraphQL API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{Connection, GithubConfig, RawRelease};
use crate::utils::http::{body_snippet, create_async_client};

const RELEASES_QUERY: &str = r#"
query ($owner: String!, $repository: String!) {
  repository(owner: $owner, name: $repository) {
    releases(first: 100, orderBy: { field: CREATED_AT, direction: DESC }) {
      nodes {
        tagName
        description
        isDraft
        isPrerelease
        createdAt
        publishedAt
        releaseAssets(first: 100) {
          nodes {
            name
            downloadUrl
            digest
          }
          totalCount
        }
      }
    }
  }
}
"#;

/// Supplies candidate releases for an ingestion pass.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Up to 100 releases of `owner/repo`, most recently created first.
    async fn fetch_recent_releases(&self, owner: &str, repo: &str) -> Result<Vec<RawRelease>>;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    releases: Connection<RawRelease>,
}

/// GraphQL client for repository releases.
pub struct GithubReleaseSource {
    client: Client,
    endpoint: String,
}

impl GithubReleaseSource {
    /// Build a source with an authenticated client for `config`.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?, &config.endpoint))
    }

    /// Use an existing client, which must already carry authentication.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReleaseSource for GithubReleaseSource {
    async fn fetch_recent_releases(&self, owner: &str, repo: &str) -> Result<Vec<RawRelease>> {
        let request = json!({
            "query": RELEASES_QUERY,
            "variables": { "owner": owner, "repository": repo },
        });

        log::debug!("Querying releases for {}/{}", owner, repo);
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "release query for {owner}/{repo} failed with HTTP {status}: {}",
                body_snippet(&body, 160)
            )));
        }

        parse_releases(&body, owner, repo)
    }
}

fn parse_releases(body: &str, owner: &str, repo: &str) -> Result<Vec<RawRelease>> {
    let response: GraphQlResponse<RepositoryData> = serde_json::from_str(body)?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(AppError::upstream(messages.join("; ")));
    }

    let repository = response
        .data
        .and_then(|d| d.repository)
        .ok_or_else(|| AppError::upstream(format!("repository {owner}/{repo} not found")))?;

    Ok(repository.releases.nodes)
}
