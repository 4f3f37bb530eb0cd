#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! On-device report cache.
//!
//! The full, ordered list of reports lives in a single UTF-8 JSON array
//! (`reports.json` by default) inside a directory the user grants once.
//! Every save rewrites the whole snapshot; there are no incremental
//! writes. The grant is remembered in a persisted [`settings::Settings`]
//! file so the user is not asked again on the next start.
//!
//! If the user refuses the directory, persistence is skipped: [`load`]
//! yields an empty list and [`save`] fails with
//! [`CacheError::PermissionDenied`], which callers log and move past.
//!
//! [`load`]: LocalReportCache::load
//! [`save`]: LocalReportCache::save

pub mod directory;
pub mod settings;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use panic_report_models::Report;
use thiserror::Error;

use crate::directory::DirectoryAccess;
use crate::settings::{DIRECTORY_KEY, Settings};

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The user refused a storage directory.
    #[error("Storage directory permission denied")]
    PermissionDenied,

    /// No snapshot has been written yet.
    #[error("No report cache at {}", .0.display())]
    NotFound(PathBuf),

    /// The snapshot or settings file is not valid JSON for its schema.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Full-snapshot JSON cache of the report list.
pub struct LocalReportCache {
    file_name: String,
    settings_path: PathBuf,
    access: Arc<dyn DirectoryAccess>,
    directory: Mutex<Option<PathBuf>>,
}

impl LocalReportCache {
    /// Creates a cache writing `file_name` into the directory obtained
    /// from `access`, remembering the grant in `settings_path`.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        settings_path: PathBuf,
        access: Arc<dyn DirectoryAccess>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            settings_path,
            access,
            directory: Mutex::new(None),
        }
    }

    /// Resolves the storage directory: in-process grant first, then the
    /// persisted setting, then a fresh request.
    async fn directory(&self) -> Result<PathBuf, CacheError> {
        if let Some(dir) = self
            .directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Ok(dir);
        }

        let mut settings = match Settings::open(&self.settings_path).await {
            Ok(settings) => settings,
            Err(CacheError::Serialization(e)) => {
                log::warn!(
                    "Ignoring corrupt settings file {}: {e}",
                    self.settings_path.display()
                );
                Settings::empty(&self.settings_path)
            }
            Err(e) => return Err(e),
        };
        let dir = if let Some(saved) = settings.get(DIRECTORY_KEY) {
            PathBuf::from(saved)
        } else {
            let Some(granted) = self.access.request_directory().await else {
                log::warn!("Storage directory permission denied; reports will not be persisted");
                return Err(CacheError::PermissionDenied);
            };
            if let Err(e) = settings
                .set(DIRECTORY_KEY, granted.to_string_lossy().into_owned())
                .await
            {
                log::warn!("Failed to remember storage directory grant: {e}");
            }
            granted
        };

        *self
            .directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(dir.clone());
        Ok(dir)
    }

    /// Path of the snapshot file, requesting the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::PermissionDenied`] if no directory is granted.
    pub async fn snapshot_path(&self) -> Result<PathBuf, CacheError> {
        Ok(self.directory().await?.join(&self.file_name))
    }

    /// Reads the persisted report list.
    ///
    /// # Errors
    ///
    /// * [`CacheError::PermissionDenied`] if no directory is granted
    /// * [`CacheError::NotFound`] if no snapshot has been written yet
    /// * [`CacheError::Serialization`] if the snapshot is malformed
    /// * [`CacheError::Io`] if the file cannot be read
    pub async fn try_load(&self) -> Result<Vec<Report>, CacheError> {
        let path = self.snapshot_path().await?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Reads the persisted report list, logging and returning an empty
    /// list on any failure.
    pub async fn load(&self) -> Vec<Report> {
        match self.try_load().await {
            Ok(reports) => {
                log::info!("Loaded {} cached reports", reports.len());
                reports
            }
            Err(CacheError::NotFound(path)) => {
                log::info!("No report cache at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                log::error!("Failed to load report cache: {e}");
                Vec::new()
            }
        }
    }

    /// Overwrites the snapshot with the full `reports` list.
    ///
    /// The list is written to a temporary file next to the snapshot and
    /// renamed over it, so readers never see a half-written file.
    ///
    /// # Errors
    ///
    /// * [`CacheError::PermissionDenied`] if no directory is granted
    /// * [`CacheError::Serialization`] / [`CacheError::Io`] on write failure
    pub async fn save(&self, reports: &[Report]) -> Result<(), CacheError> {
        let dir = self.directory().await?;
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(&self.file_name);
        let json = serde_json::to_string_pretty(reports)?;
        write_atomic(&path, json.as_bytes()).await?;

        log::debug!("Saved {} reports to {}", reports.len(), path.display());
        Ok(())
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use panic_report_models::{FileAttachment, Position, ReportDraft, ReportType, Urgency};

    use super::*;
    use crate::directory::{DeniedDirectory, FixedDirectory};

    fn cache_in(root: &Path) -> LocalReportCache {
        LocalReportCache::new(
            "reports.json",
            root.join("settings.json"),
            Arc::new(FixedDirectory::new(root.join("reports"))),
        )
    }

    fn sample(n: usize) -> Vec<Report> {
        (0..n)
            .map(|i| {
                let draft = ReportDraft::new(ReportType::Panic, format!("report {i}"), Urgency::High)
                    .with_position(Some(Position {
                        latitude: -7.0,
                        longitude: -35.0,
                        timestamp: 1_700_000_000_000,
                    }))
                    .with_file((i % 2 == 0).then(|| FileAttachment {
                        uri: format!("/tmp/{i}.m4a"),
                        name: format!("{i}.m4a"),
                        mime_type: "audio/m4a".to_string(),
                    }));
                let at = Utc.timestamp_opt(1_700_000_000 + i64::try_from(i).unwrap(), 0).unwrap();
                Report::from_draft(draft, format!("id-{i}"), at)
            })
            .collect()
    }

    #[tokio::test]
    async fn save_then_load_preserves_count_and_order() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        let reports = sample(5);

        cache.save(&reports).await.unwrap();
        let loaded = cache.try_load().await.unwrap();

        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded, reports);
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());

        cache.save(&sample(4)).await.unwrap();
        cache.save(&sample(2)).await.unwrap();

        assert_eq!(cache.try_load().await.unwrap().len(), 2);
        let snapshot = tmp.path().join("reports").join("reports.json");
        assert!(snapshot.exists());
        assert!(!tmp.path().join("reports").join("reports.json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_snapshot_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());

        assert!(matches!(cache.try_load().await, Err(CacheError::NotFound(_))));
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_snapshot_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        std::fs::create_dir_all(tmp.path().join("reports")).unwrap();
        std::fs::write(tmp.path().join("reports").join("reports.json"), "[{").unwrap();

        assert!(matches!(
            cache.try_load().await,
            Err(CacheError::Serialization(_))
        ));
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn denied_directory_skips_persistence() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalReportCache::new(
            "reports.json",
            tmp.path().join("settings.json"),
            Arc::new(DeniedDirectory),
        );

        assert!(matches!(
            cache.save(&sample(1)).await,
            Err(CacheError::PermissionDenied)
        ));
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_settings_fall_back_to_a_fresh_grant() {
        let tmp = tempfile::tempdir().unwrap();
        let settings_path = tmp.path().join("settings.json");
        std::fs::write(&settings_path, "{not json").unwrap();
        let cache = cache_in(tmp.path());

        assert!(cache.load().await.is_empty());
        cache.save(&sample(2)).await.unwrap();
        assert_eq!(cache.try_load().await.unwrap().len(), 2);

        let rewritten = Settings::open(&settings_path).await.unwrap();
        assert_eq!(
            rewritten.get(DIRECTORY_KEY),
            Some(tmp.path().join("reports").to_string_lossy().as_ref())
        );
    }

    #[tokio::test]
    async fn grant_is_remembered_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        cache_in(tmp.path()).save(&sample(3)).await.unwrap();

        // A later process that would be refused still finds the old grant.
        let reopened = LocalReportCache::new(
            "reports.json",
            tmp.path().join("settings.json"),
            Arc::new(DeniedDirectory),
        );
        assert_eq!(reopened.try_load().await.unwrap().len(), 3);
    }
}
