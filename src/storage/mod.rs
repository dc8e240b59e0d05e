//! Storage abstractions for update persistence.
//!
//! Two record kinds are stored:
//! - `Update`: one version on one branch, unique on `(version, branch)`
//! - `UpdateFile`: a downloadable artifact owned by exactly one `Update`
//!
//! Stores only ever append. The uniqueness of `(version, branch)` must be
//! enforced by the store itself, since concurrent ingestion passes can both
//! pass the existence check before either inserts.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Branch, Update, UpdateFile};

// Re-export for convenience
pub use local::LocalStorage;

/// Persistence for [`Update`] records.
#[async_trait]
pub trait UpdateStore: Send + Sync {
    /// Look up the update for `version` on `branch`.
    async fn find_by_version_and_branch(
        &self,
        version: &str,
        branch: Branch,
    ) -> Result<Option<Update>>;

    /// Insert a new update and return it with its assigned id.
    ///
    /// Fails with `AppError::DuplicateKey` if `(version, branch)` exists.
    async fn insert_update(&self, update: Update) -> Result<Update>;

    /// All updates in insertion order.
    async fn list_all(&self) -> Result<Vec<Update>>;
}

/// Persistence for [`UpdateFile`] records.
#[async_trait]
pub trait UpdateFileStore: Send + Sync {
    /// Insert a file for an existing update.
    async fn insert_file(&self, file: UpdateFile) -> Result<UpdateFile>;

    /// Files owned by `update_id`, in insertion order.
    async fn files_for_update(&self, update_id: u64) -> Result<Vec<UpdateFile>>;
}
