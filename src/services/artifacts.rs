// src/services/artifacts.rs

//! Artifact classification: filename platform metadata plus digest.

use std::sync::Arc;

use crate::models::{Architecture, OperatingSystem, RawAsset, UpdateFile};
use crate::services::filename::{ConventionParser, FilenameParser};

/// Platform metadata for one release asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub operating_system: OperatingSystem,
    pub architecture: Architecture,
    pub runtime: String,
    pub installer: bool,
    pub hash: Option<String>,
}

impl ArtifactMetadata {
    /// Build the stored record for `asset` under `update_id`.
    pub fn into_update_file(self, update_id: u64, asset: &RawAsset) -> UpdateFile {
        UpdateFile {
            update_id,
            operating_system: self.operating_system,
            architecture: self.architecture,
            runtime: self.runtime,
            filename: asset.name.clone(),
            url: asset.download_url.clone(),
            hash: self.hash,
            installer: self.installer,
        }
    }
}

/// Classifies release assets via a [`FilenameParser`].
#[derive(Clone)]
pub struct ArtifactClassifier {
    parser: Arc<dyn FilenameParser>,
}

impl Default for ArtifactClassifier {
    fn default() -> Self {
        Self::new(Arc::new(ConventionParser))
    }
}

impl ArtifactClassifier {
    pub fn new(parser: Arc<dyn FilenameParser>) -> Self {
        Self { parser }
    }

    /// Classify an asset, or `None` when its name matches no platform.
    pub fn classify(&self, name: &str, digest: Option<&str>) -> Option<ArtifactMetadata> {
        let operating_system = self.parser.parse_operating_system(name)?;

        Some(ArtifactMetadata {
            operating_system,
            architecture: self.parser.parse_architecture(name),
            runtime: self.parser.parse_runtime(name),
            installer: self.parser.parse_installer(name),
            hash: digest.and_then(split_digest),
        })
    }
}

/// Hex part of an `<algorithm>:<hex>` digest, lower-cased.
pub fn split_digest(digest: &str) -> Option<String> {
    digest
        .split_once(':')
        .map(|(_, hash)| hash.to_ascii_lowercase())
}
