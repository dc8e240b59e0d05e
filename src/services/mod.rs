//! Service layer for the update feed.
//!
//! This module contains the decision logic used by an ingestion pass:
//! - Version parsing and ordering keys (`Version`)
//! - Changelog extraction (`Changelog`)
//! - Artifact classification (`ArtifactClassifier`, `FilenameParser`)
//! - Branch classification (`classify_branch`)
//! - Upstream release fetching (`ReleaseSource`, `GithubReleaseSource`)

mod artifacts;
mod branch;
mod changelog;
mod filename;
mod github;
mod version;

pub use artifacts::{ArtifactClassifier, ArtifactMetadata, split_digest};
pub use branch::classify_branch;
pub use changelog::Changelog;
pub use filename::{ConventionParser, FilenameParser};
pub use github::{GithubReleaseSource, ReleaseSource};
pub use version::Version;
