//! Composition root: builds every provider and the store from [`Config`].

use std::sync::Arc;

use panic_report_cache::LocalReportCache;
use panic_report_cache::directory::{DirectoryAccess, FixedDirectory};
use panic_report_client::ReportClient;
use panic_report_config::{Config, StoreMode};
use panic_report_device::audio::{AudioBackend, AudioCaptureProvider, FileAudioBackend, NoAudio};
use panic_report_device::location::{
    FixedLocation, GeolocationProvider, LocationSource, NoLocation,
};
use panic_report_device::permission::{PermissionPrompt, Permissions, StaticPrompt};
use panic_report_store::{LocalBackend, RemoteBackend, ReportBackend, ReportStore};

use crate::prompts::{TerminalDirectoryAccess, TerminalPermissionPrompt};

/// Everything a command needs, wired from configuration.
pub struct App {
    pub config: Config,
    pub client: ReportClient,
    pub store: ReportStore,
    pub geolocation: GeolocationProvider,
    pub audio: AudioCaptureProvider,
    directory: Arc<dyn DirectoryAccess>,
}

impl App {
    /// Builds the app. With `assume_yes` every permission and the storage
    /// directory are granted without asking.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built from the API
    /// settings.
    pub fn build(config: Config, assume_yes: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let prompt: Arc<dyn PermissionPrompt> = if assume_yes {
            Arc::new(StaticPrompt::grant_all())
        } else {
            Arc::new(TerminalPermissionPrompt)
        };
        let directory: Arc<dyn DirectoryAccess> = if assume_yes {
            Arc::new(FixedDirectory::new(config.cache.data_dir.clone()))
        } else {
            Arc::new(TerminalDirectoryAccess::new(config.cache.data_dir.clone()))
        };
        let permissions = Arc::new(Permissions::new(prompt));

        let location: Arc<dyn LocationSource> = match &config.device.location {
            Some(fixed) => Arc::new(FixedLocation::new(fixed.latitude, fixed.longitude)),
            None => Arc::new(NoLocation),
        };
        let recorder: Box<dyn AudioBackend> = match &config.device.audio_source {
            Some(source) => Box::new(FileAudioBackend::new(
                source.clone(),
                config.device.capture_dir.clone(),
            )),
            None => Box::new(NoAudio),
        };

        let client = ReportClient::new(&config.api)?;
        let backend: Box<dyn ReportBackend> = match config.store.mode {
            StoreMode::Local => Box::new(LocalBackend::new(local_cache(&config, directory.clone()))),
            StoreMode::Remote => Box::new(RemoteBackend::new(client.clone())),
        };
        log::debug!("Using {:?} report store", config.store.mode);

        Ok(Self {
            client,
            store: ReportStore::new(backend),
            geolocation: GeolocationProvider::new(permissions.clone(), location),
            audio: AudioCaptureProvider::new(permissions, recorder),
            directory,
            config,
        })
    }

    /// A handle on the on-device cache, independent of the store mode.
    #[must_use]
    pub fn cache(&self) -> LocalReportCache {
        local_cache(&self.config, self.directory.clone())
    }
}

fn local_cache(config: &Config, directory: Arc<dyn DirectoryAccess>) -> LocalReportCache {
    LocalReportCache::new(
        config.cache.file_name.clone(),
        config.cache.settings_path(),
        directory,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path, mode: &str) -> Config {
        let toml = format!(
            "[store]\nmode = \"{mode}\"\n[cache]\ndata_dir = {:?}\n",
            dir.display().to_string()
        );
        Config::from_layers(&[&toml]).unwrap()
    }

    #[tokio::test]
    async fn local_mode_persists_to_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = App::build(config_in(tmp.path(), "local"), true).unwrap();
        assert_eq!(app.store.backend_name(), "local");

        let draft = panic_report_models::ReportDraft::new(
            panic_report_models::ReportType::Other,
            "x",
            panic_report_models::Urgency::Low,
        );
        app.store.add_report(draft).await.unwrap();

        assert_eq!(app.cache().try_load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn separate_sessions_append_to_the_same_cache() {
        let tmp = tempfile::tempdir().unwrap();
        for description in ["first", "second"] {
            let mut app = App::build(config_in(tmp.path(), "local"), true).unwrap();
            let draft = panic_report_models::ReportDraft::new(
                panic_report_models::ReportType::Other,
                description,
                panic_report_models::Urgency::Low,
            );
            app.store.add_report(draft).await.unwrap();
        }

        let app = App::build(config_in(tmp.path(), "local"), true).unwrap();
        let cached = app.cache().try_load().await.unwrap();
        let descriptions: Vec<_> = cached
            .iter()
            .map(panic_report_models::Report::description)
            .collect();
        assert_eq!(descriptions, ["first", "second"]);
    }

    #[test]
    fn remote_mode_uses_remote_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let app = App::build(config_in(tmp.path(), "remote"), true).unwrap();
        assert_eq!(app.store.backend_name(), "remote");
    }
}
