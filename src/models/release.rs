//! Upstream release shape, as returned by the GitHub GraphQL API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page of nodes with an optional total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default)]
    pub nodes: Vec<T>,

    #[serde(default)]
    pub total_count: Option<usize>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            total_count: None,
        }
    }
}

/// A published release snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelease {
    pub tag_name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_draft: bool,

    #[serde(default)]
    pub is_prerelease: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(rename = "releaseAssets", default)]
    pub assets: Connection<RawAsset>,
}

impl RawRelease {
    /// Asset count as reported upstream, falling back to the nodes received.
    pub fn asset_count(&self) -> usize {
        self.assets.total_count.unwrap_or(self.assets.nodes.len())
    }

    /// Description text, empty when upstream sent none.
    pub fn body(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A downloadable asset attached to a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    pub name: String,
    pub download_url: String,

    /// `<algorithm>:<hex>`
    #[serde(default)]
    pub digest: Option<String>,
}
