//! Stored feed records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Distribution channel a version is served on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Stable channel
    Master,
    /// Development channel
    Develop,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Master => "master",
            Branch::Develop => "develop",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Branch {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "master" => Ok(Branch::Master),
            "develop" => Ok(Branch::Develop),
            other => Err(AppError::validation(format!("Unknown branch '{other}'"))),
        }
    }
}

/// Platform an artifact targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    Linux,
    LinuxMusl,
    Osx,
    FreeBsd,
}

/// CPU architecture an artifact targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    X64,
    X86,
    Arm,
    Arm64,
}

/// One version on one branch.
///
/// `(version, branch)` is unique across the store. `id` is `0` until the
/// store assigns one on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Update {
    pub id: u64,

    /// Canonical dotted version string
    pub version: String,

    /// Ordering key derived from `version`
    pub int_version: i64,

    /// Upstream publication time
    pub release_date: DateTime<Utc>,

    pub branch: Branch,

    /// Feature lines from the changelog, in source order
    #[serde(default)]
    pub new: Vec<String>,

    /// Fix lines from the changelog, in source order
    #[serde(default)]
    pub fixed: Vec<String>,
}

/// A downloadable file belonging to an [`Update`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateFile {
    pub update_id: u64,
    pub operating_system: OperatingSystem,
    pub architecture: Architecture,

    /// Runtime flavour, may be empty
    #[serde(default)]
    pub runtime: String,

    pub filename: String,
    pub url: String,

    /// Lower-case hex digest, absent when upstream published none
    #[serde(default)]
    pub hash: Option<String>,

    pub installer: bool,
}
