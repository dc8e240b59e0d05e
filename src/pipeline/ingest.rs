// src/pipeline/ingest.rs

//! Release ingestion pass.
//!
//! One pass:
//! 1. fetches the most recently created releases,
//! 2. keeps published, non-draft releases tagged `v<version>`,
//! 3. takes the newest [`RELEASE_WINDOW`] by publish time and walks them
//!    oldest first, so unseen releases are appended chronologically,
//! 4. stores each release once per branch, mirroring stable releases onto
//!    the development branch.
//!
//! Releases are processed strictly one after another. Any error ends the
//! pass; records stored for earlier releases stay, and a later pass skips
//! them because `(version, branch)` already exists.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Branch, Config, GithubConfig, RawRelease, Update};
use crate::services::{
    ArtifactClassifier, Changelog, GithubReleaseSource, ReleaseSource, Version, classify_branch,
};
use crate::storage::{UpdateFileStore, UpdateStore};

/// Number of newest published releases considered per pass.
pub const RELEASE_WINDOW: usize = 5;

/// Largest asset count a single release may carry.
pub const MAX_RELEASE_ASSETS: usize = 100;

/// A release that passed filtering.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub release: RawRelease,
    /// Tag without the leading `v`
    pub version: String,
    pub published_at: DateTime<Utc>,
}

/// Filter, window and order fetched releases for processing.
///
/// Returns at most [`RELEASE_WINDOW`] candidates, oldest publication first.
pub fn select_candidates(releases: Vec<RawRelease>) -> Vec<Candidate> {
    let mut published: Vec<(DateTime<Utc>, RawRelease)> = releases
        .into_iter()
        .filter(|r| !r.is_draft)
        .filter_map(|r| r.published_at.map(|at| (at, r)))
        .collect();

    published.sort_by(|a, b| b.0.cmp(&a.0));

    let mut candidates: Vec<Candidate> = published
        .into_iter()
        .filter_map(|(published_at, release)| {
            let version = tag_version(&release.tag_name)?.to_string();
            Some(Candidate {
                release,
                version,
                published_at,
            })
        })
        .take(RELEASE_WINDOW)
        .collect();

    candidates.reverse();
    candidates
}

/// Version text of a `v<version>` tag, if the version is accepted.
pub fn tag_version(tag: &str) -> Option<&str> {
    tag.strip_prefix('v').filter(|v| Version::is_valid(v))
}

/// Drives one ingestion pass against a release source and stores.
pub struct ReleaseIngestor {
    github: Arc<GithubConfig>,
    source: Arc<dyn ReleaseSource>,
    updates: Arc<dyn UpdateStore>,
    files: Arc<dyn UpdateFileStore>,
    classifier: ArtifactClassifier,
}

impl ReleaseIngestor {
    pub fn new(
        github: Arc<GithubConfig>,
        source: Arc<dyn ReleaseSource>,
        updates: Arc<dyn UpdateStore>,
        files: Arc<dyn UpdateFileStore>,
    ) -> Self {
        Self {
            github,
            source,
            updates,
            files,
            classifier: ArtifactClassifier::default(),
        }
    }

    /// Replace the artifact classifier.
    pub fn with_classifier(mut self, classifier: ArtifactClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run one pass and return the branches that received new updates.
    pub async fn run(&self) -> Result<BTreeSet<Branch>> {
        let owner = self.github.owner();
        let project = self.github.project.as_str();

        let releases = self.source.fetch_recent_releases(owner, project).await?;
        let fetched = releases.len();
        let candidates = select_candidates(releases);

        log::info!(
            "Fetched {} releases for {}/{}, {} candidates",
            fetched,
            owner,
            project,
            candidates.len()
        );

        let mut touched = BTreeSet::new();

        for candidate in &candidates {
            let tag = &candidate.release.tag_name;
            let asset_count = candidate.release.asset_count();

            if asset_count > MAX_RELEASE_ASSETS {
                return Err(AppError::TooManyReleaseAssets {
                    tag: tag.clone(),
                    count: asset_count,
                });
            }

            let branch = classify_branch(&candidate.release.assets.nodes, project);
            log::debug!("Release {} classified as {}", tag, branch);

            if self.process_release(candidate, branch).await? {
                touched.insert(branch);
            }

            // Stable releases are also served on develop
            if branch == Branch::Master && self.process_release(candidate, Branch::Develop).await? {
                touched.insert(Branch::Develop);
            }
        }

        log::info!(
            "Ingestion pass complete, updated branches: [{}]",
            touched
                .iter()
                .map(Branch::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(touched)
    }

    /// Store `candidate` on `branch` unless it is already there.
    ///
    /// Returns whether anything was stored.
    async fn process_release(&self, candidate: &Candidate, branch: Branch) -> Result<bool> {
        let version = candidate.version.as_str();

        if self
            .updates
            .find_by_version_and_branch(version, branch)
            .await?
            .is_some()
        {
            log::debug!("{} on {} already ingested", version, branch);
            return Ok(false);
        }

        let int_version = Version::parse(version)?.encode()?;
        let changelog = Changelog::extract(candidate.release.body());

        let update = self
            .updates
            .insert_update(Update {
                id: 0,
                version: version.to_string(),
                int_version,
                release_date: candidate.published_at,
                branch,
                new: changelog.features,
                fixed: changelog.fixes,
            })
            .await?;

        let mut stored_files = 0;
        for asset in &candidate.release.assets.nodes {
            let Some(metadata) = self.classifier.classify(&asset.name, asset.digest.as_deref())
            else {
                log::debug!("Skipping unrecognised asset {}", asset.name);
                continue;
            };

            self.files
                .insert_file(metadata.into_update_file(update.id, asset))
                .await?;
            stored_files += 1;
        }

        log::info!(
            "Added {} on {} (id {}, {} new, {} fixed, {} files)",
            update.version,
            update.branch,
            update.id,
            update.new.len(),
            update.fixed.len(),
            stored_files
        );

        Ok(true)
    }
}

/// Run one ingestion pass against GitHub with the given stores.
pub async fn run_ingest<S>(config: &Config, storage: Arc<S>) -> Result<BTreeSet<Branch>>
where
    S: UpdateStore + UpdateFileStore + 'static,
{
    config.validate()?;

    let github = Arc::new(config.github.clone());
    let source = Arc::new(GithubReleaseSource::new(&github)?);
    let ingestor = ReleaseIngestor::new(github, source, storage.clone(), storage);

    ingestor.run().await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    use super::*;
    use crate::models::{Connection, RawAsset, UpdateFile};
    use crate::storage::LocalStorage;

    const SHA: &str = "abcdef0123456789abcdef0123456789abcdef01";

    /// Serves a fixed release list and counts queries.
    struct ScriptedSource {
        releases: Vec<RawRelease>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedSource {
        fn new(releases: Vec<RawRelease>) -> Arc<Self> {
            Arc::new(Self {
                releases,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ReleaseSource for ScriptedSource {
        async fn fetch_recent_releases(&self, owner: &str, repo: &str) -> Result<Vec<RawRelease>> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.to_string(), repo.to_string()));
            Ok(self.releases.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ReleaseSource for FailingSource {
        async fn fetch_recent_releases(&self, _: &str, _: &str) -> Result<Vec<RawRelease>> {
            Err(AppError::upstream("service unavailable"))
        }
    }

    /// Store whose existence check never sees anything, as when a concurrent
    /// pass inserts between check and insert.
    struct BlindStore(LocalStorage);

    #[async_trait]
    impl UpdateStore for BlindStore {
        async fn find_by_version_and_branch(&self, _: &str, _: Branch) -> Result<Option<Update>> {
            Ok(None)
        }
        async fn insert_update(&self, update: Update) -> Result<Update> {
            self.0.insert_update(update).await
        }
        async fn list_all(&self) -> Result<Vec<Update>> {
            self.0.list_all().await
        }
    }

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn asset(name: &str) -> RawAsset {
        RawAsset {
            name: name.to_string(),
            download_url: format!("https://github.com/Servarr/MyApp/releases/download/{name}"),
            digest: Some(format!("sha256:{}", "ab".repeat(32))),
        }
    }

    fn release(tag: &str, branch: &str, hours: i64) -> RawRelease {
        let version = tag.trim_start_matches('v');
        RawRelease {
            tag_name: tag.to_string(),
            description: Some(format!(
                "* {SHA} New: Feature in {version}\r\n* {SHA} Fixed: Bug in {version}\r\n"
            )),
            is_draft: false,
            is_prerelease: false,
            created_at: Some(at(hours)),
            published_at: Some(at(hours)),
            assets: Connection {
                nodes: vec![
                    asset(&format!("MyApp.{branch}.{version}.linux-core-x64.tar.gz")),
                    asset(&format!("MyApp.{branch}.{version}.windows-core-x64-installer.exe")),
                    asset("checksums.txt"),
                ],
                total_count: Some(3),
            },
        }
    }

    fn github() -> Arc<GithubConfig> {
        Arc::new(GithubConfig {
            api_token: "token".into(),
            organization: Some("Servarr".into()),
            project: "MyApp".into(),
            ..GithubConfig::default()
        })
    }

    fn ingestor(source: Arc<dyn ReleaseSource>, storage: &Arc<LocalStorage>) -> ReleaseIngestor {
        ReleaseIngestor::new(github(), source, storage.clone(), storage.clone())
    }

    async fn stored(storage: &LocalStorage) -> Vec<(String, Branch)> {
        storage
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| (u.version, u.branch))
            .collect()
    }

    async fn all_files(storage: &LocalStorage) -> Vec<UpdateFile> {
        let mut files = Vec::new();
        for update in storage.list_all().await.unwrap() {
            files.extend(storage.files_for_update(update.id).await.unwrap());
        }
        files
    }

    #[test]
    fn tag_version_requires_v_prefix_and_valid_version() {
        assert_eq!(tag_version("v2.0.0"), Some("2.0.0"));
        assert_eq!(tag_version("2.0.0"), None);
        assert_eq!(tag_version("v2.0.0-beta"), None);
        assert_eq!(tag_version("V2.0.0"), None);
        assert_eq!(tag_version("v"), None);
    }

    #[test]
    fn select_candidates_windows_newest_and_orders_oldest_first() {
        let releases: Vec<RawRelease> = (0..8)
            .map(|i| release(&format!("v1.0.{i}"), "develop", i))
            .collect();

        let versions: Vec<String> = select_candidates(releases)
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["1.0.3", "1.0.4", "1.0.5", "1.0.6", "1.0.7"]);
    }

    #[test]
    fn select_candidates_drops_drafts_unpublished_and_bad_tags() {
        let mut draft = release("v3.0.0", "develop", 10);
        draft.is_draft = true;
        let mut unpublished = release("v3.0.1", "develop", 11);
        unpublished.published_at = None;
        let mut prerelease = release("v3.0.2", "develop", 12);
        prerelease.is_prerelease = true;

        let releases = vec![
            draft,
            unpublished,
            prerelease,
            release("v2.0.0-beta", "develop", 13),
            release("2.0.0", "develop", 14),
            release("v2.0.0", "develop", 1),
        ];

        let versions: Vec<String> = select_candidates(releases)
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["2.0.0", "3.0.2"]);
    }

    #[test]
    fn invalid_tags_do_not_use_up_the_window() {
        let mut releases: Vec<RawRelease> = (0..5)
            .map(|i| release(&format!("v1.{i}.0"), "develop", i))
            .collect();
        releases.extend((0..3).map(|i| release(&format!("nightly-{i}"), "develop", 100 + i)));

        assert_eq!(select_candidates(releases).len(), 5);
    }

    #[tokio::test]
    async fn stores_releases_in_publication_order() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let source = ScriptedSource::new(vec![
            release("v1.2.0", "develop", 2),
            release("v1.3.0", "develop", 3),
            release("v1.1.0", "develop", 1),
        ]);

        let touched = ingestor(source.clone(), &storage).run().await.unwrap();

        assert_eq!(touched, BTreeSet::from([Branch::Develop]));
        assert_eq!(
            stored(&storage).await,
            vec![
                ("1.1.0".to_string(), Branch::Develop),
                ("1.2.0".to_string(), Branch::Develop),
                ("1.3.0".to_string(), Branch::Develop),
            ]
        );
        assert_eq!(
            source.calls.lock().unwrap().as_slice(),
            &[("Servarr".to_string(), "MyApp".to_string())]
        );
    }

    #[tokio::test]
    async fn second_pass_inserts_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let source = ScriptedSource::new(vec![
            release("v4.1.0", "master", 2),
            release("v4.2.0", "develop", 3),
        ]);
        let ingestor = ingestor(source, &storage);

        let first = ingestor.run().await.unwrap();
        let updates = storage.list_all().await.unwrap();
        let files = all_files(&storage).await;

        let second = ingestor.run().await.unwrap();

        assert_eq!(first, BTreeSet::from([Branch::Master, Branch::Develop]));
        assert!(second.is_empty());
        assert_eq!(storage.list_all().await.unwrap(), updates);
        assert_eq!(all_files(&storage).await, files);
    }

    #[tokio::test]
    async fn stable_release_is_mirrored_onto_develop() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let source = ScriptedSource::new(vec![release("v4.1.0", "master", 1)]);

        let touched = ingestor(source, &storage).run().await.unwrap();
        assert_eq!(touched, BTreeSet::from([Branch::Master, Branch::Develop]));

        let updates = storage.list_all().await.unwrap();
        assert_eq!(updates.len(), 2);
        let (master, develop) = (&updates[0], &updates[1]);
        assert_eq!((master.version.as_str(), master.branch), ("4.1.0", Branch::Master));
        assert_eq!((develop.version.as_str(), develop.branch), ("4.1.0", Branch::Develop));
        assert_ne!(master.id, develop.id);
        assert_eq!(master.new, develop.new);
        assert_eq!(master.fixed, develop.fixed);
        assert_eq!(master.int_version, develop.int_version);

        let master_files = storage.files_for_update(master.id).await.unwrap();
        let develop_files = storage.files_for_update(develop.id).await.unwrap();
        assert_eq!(master_files.len(), 2);
        assert_eq!(develop_files.len(), 2);
        assert!(develop_files.iter().all(|f| f.update_id == develop.id));
    }

    #[tokio::test]
    async fn mirror_is_checked_even_when_stable_exists() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));

        let existing = select_candidates(vec![release("v4.1.0", "master", 1)]).remove(0);
        storage
            .insert_update(Update {
                id: 0,
                version: existing.version,
                int_version: 0,
                release_date: existing.published_at,
                branch: Branch::Master,
                new: Vec::new(),
                fixed: Vec::new(),
            })
            .await
            .unwrap();

        let source = ScriptedSource::new(vec![release("v4.1.0", "master", 1)]);
        let touched = ingestor(source, &storage).run().await.unwrap();

        assert_eq!(touched, BTreeSet::from([Branch::Develop]));
        assert_eq!(
            stored(&storage).await,
            vec![
                ("4.1.0".to_string(), Branch::Master),
                ("4.1.0".to_string(), Branch::Develop),
            ]
        );
    }

    #[tokio::test]
    async fn stores_changelog_and_classified_files() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let mut rel = release("v5.0.0.100", "develop", 1);
        rel.assets.nodes[0].digest = None;
        let source = ScriptedSource::new(vec![rel]);

        ingestor(source, &storage).run().await.unwrap();

        let update = storage.list_all().await.unwrap().remove(0);
        assert_eq!(update.new, vec!["Feature in 5.0.0.100"]);
        assert_eq!(update.fixed, vec!["Bug in 5.0.0.100"]);
        assert_eq!(update.int_version, Version::parse("5.0.0.100").unwrap().encode().unwrap());
        assert_eq!(update.release_date, at(1));

        let files = storage.files_for_update(update.id).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "MyApp.develop.5.0.0.100.linux-core-x64.tar.gz",
                "MyApp.develop.5.0.0.100.windows-core-x64-installer.exe",
            ]
        );
        assert_eq!(files[0].hash, None);
        assert_eq!(files[1].hash.as_deref(), Some("ab".repeat(32).as_str()));
        assert!(files[1].installer);
        assert_eq!(files[0].runtime, "netcore");
    }

    #[tokio::test]
    async fn empty_description_yields_empty_changelog() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let mut rel = release("v6.0.0", "develop", 1);
        rel.description = None;

        ingestor(ScriptedSource::new(vec![rel]), &storage)
            .run()
            .await
            .unwrap();

        let update = storage.list_all().await.unwrap().remove(0);
        assert!(update.new.is_empty());
        assert!(update.fixed.is_empty());
    }

    #[tokio::test]
    async fn oversized_release_aborts_the_pass() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));

        let mut huge = release("v1.2.0", "develop", 2);
        huge.assets.nodes = (0..101)
            .map(|i| asset(&format!("MyApp.develop.1.2.0.part{i}.linux-core-x64.tar.gz")))
            .collect();
        huge.assets.total_count = None;

        let source = ScriptedSource::new(vec![
            release("v1.3.0", "develop", 3),
            huge,
            release("v1.1.0", "develop", 1),
        ]);

        let err = ingestor(source, &storage).run().await.unwrap_err();

        match err {
            AppError::TooManyReleaseAssets { tag, count } => {
                assert_eq!(tag, "v1.2.0");
                assert_eq!(count, 101);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            stored(&storage).await,
            vec![("1.1.0".to_string(), Branch::Develop)]
        );
    }

    #[tokio::test]
    async fn upstream_total_count_drives_asset_cap() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let mut rel = release("v1.0.0", "develop", 1);
        rel.assets.total_count = Some(250);

        let err = ingestor(ScriptedSource::new(vec![rel]), &storage)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TooManyReleaseAssets { count: 250, .. }));
        assert!(storage.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_key_from_store_is_surfaced() {
        let tmp = TempDir::new().unwrap();
        let local = LocalStorage::new(tmp.path());
        let storage = Arc::new(local.clone());

        ingestor(ScriptedSource::new(vec![release("v2.0.0", "develop", 1)]), &storage)
            .run()
            .await
            .unwrap();

        let racing = ReleaseIngestor::new(
            github(),
            ScriptedSource::new(vec![release("v2.0.0", "develop", 1)]),
            Arc::new(BlindStore(local.clone())),
            storage.clone(),
        );
        let err = racing.run().await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateKey { .. }));
        assert_eq!(local.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));

        let err = ingestor(Arc::new(FailingSource), &storage)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert!(storage.list_all().await.unwrap().is_empty());
    }
}
