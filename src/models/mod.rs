// src/models/mod.rs

//! Domain models for the update feed.
//!
//! - `release`: the upstream release shape consumed by an ingestion pass
//! - `update`: the records persisted and later served
//! - `config`: application configuration

mod config;
mod release;
mod update;

// Re-export all public types
pub use config::{Config, GithubConfig, LoggingConfig};
pub use release::{Connection, RawAsset, RawRelease};
pub use update::{Architecture, Branch, OperatingSystem, Update, UpdateFile};
