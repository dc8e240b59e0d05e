//! Pipeline entry points for feed operations.
//!
//! - `run_ingest`: fetch upstream releases and append new updates

pub mod ingest;

pub use ingest::{
    Candidate, MAX_RELEASE_ASSETS, RELEASE_WINDOW, ReleaseIngestor, run_ingest, select_candidates,
    tag_version,
};
