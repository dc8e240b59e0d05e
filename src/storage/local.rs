//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Feed configuration
//! ├── updates.json          # Update records, insertion order
//! ├── update_files.json     # UpdateFile records, insertion order
//! └── .lock                 # Exclusive lock held by writers
//! ```
//!
//! Every write replaces the whole file atomically (temp file, then rename).
//! Read-modify-write cycles hold an exclusive OS lock on `.lock`, so handles
//! in separate tasks or separate processes never interleave their inserts.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use async_trait::async_trait;
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Branch, Update, UpdateFile};
use crate::storage::{UpdateFileStore, UpdateStore};

const UPDATES_KEY: &str = "updates.json";
const FILES_KEY: &str = "update_files.json";
const LOCK_KEY: &str = ".lock";

/// Exclusive store lock, released on drop.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Wait, off the async runtime, until this handle holds the store lock.
    async fn lock(&self) -> Result<StoreLock> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let path = self.path(LOCK_KEY);
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| AppError::storage(format!("store lock task failed: {e}")))??;

        Ok(StoreLock { file })
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read a JSON list, empty if the file doesn't exist.
    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl UpdateStore for LocalStorage {
    async fn find_by_version_and_branch(
        &self,
        version: &str,
        branch: Branch,
    ) -> Result<Option<Update>> {
        let updates: Vec<Update> = self.read_list(UPDATES_KEY).await?;
        Ok(updates
            .into_iter()
            .find(|u| u.version == version && u.branch == branch))
    }

    async fn insert_update(&self, mut update: Update) -> Result<Update> {
        let _lock = self.lock().await?;
        let mut updates: Vec<Update> = self.read_list(UPDATES_KEY).await?;

        if updates
            .iter()
            .any(|u| u.version == update.version && u.branch == update.branch)
        {
            return Err(AppError::duplicate(update.version, update.branch));
        }

        update.id = updates.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        updates.push(update.clone());
        self.write_json(UPDATES_KEY, &updates).await?;

        log::debug!(
            "Stored update {} ({} on {})",
            update.id,
            update.version,
            update.branch
        );
        Ok(update)
    }

    async fn list_all(&self) -> Result<Vec<Update>> {
        self.read_list(UPDATES_KEY).await
    }
}

#[async_trait]
impl UpdateFileStore for LocalStorage {
    async fn insert_file(&self, file: UpdateFile) -> Result<UpdateFile> {
        let _lock = self.lock().await?;

        let updates: Vec<Update> = self.read_list(UPDATES_KEY).await?;
        if !updates.iter().any(|u| u.id == file.update_id) {
            return Err(AppError::storage(format!(
                "cannot store {}: update {} does not exist",
                file.filename, file.update_id
            )));
        }

        let mut files: Vec<UpdateFile> = self.read_list(FILES_KEY).await?;
        files.push(file.clone());
        self.write_json(FILES_KEY, &files).await?;
        Ok(file)
    }

    async fn files_for_update(&self, update_id: u64) -> Result<Vec<UpdateFile>> {
        let files: Vec<UpdateFile> = self.read_list(FILES_KEY).await?;
        Ok(files
            .into_iter()
            .filter(|f| f.update_id == update_id)
            .collect())
    }
}
