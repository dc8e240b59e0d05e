// src/services/branch.rs

//! Branch classification by asset naming.

use crate::models::{Branch, RawAsset};

/// Stable when any asset is named `<project>.master…`, development otherwise.
///
/// The match is case-sensitive and independent of asset order.
pub fn classify_branch(assets: &[RawAsset], project: &str) -> Branch {
    let stable_prefix = format!("{project}.master");

    if assets.iter().any(|a| a.name.starts_with(&stable_prefix)) {
        Branch::Master
    } else {
        Branch::Develop
    }
}
