//! The panic action.
//!
//! When audio permission is available the action records for the
//! configured window while taking a position fix, then submits a panic
//! report carrying the recording. Every device failure degrades the report
//! instead of aborting it: a failed stop drops the file and marks the
//! description, a failed fix drops the position. Only a cancelled window
//! submits nothing.

use panic_report_config::PanicConfig;
use panic_report_device::audio::AudioCaptureProvider;
use panic_report_device::location::GeolocationProvider;
use panic_report_device::window::{ScheduledWindow, WindowOutcome};
use panic_report_device::{Capability, DeviceError};
use panic_report_models::{FileAttachment, Position, Report, ReportDraft};

use crate::{ReportStore, StoreError};

/// Result of a panic action.
#[derive(Debug, Clone, PartialEq)]
pub enum PanicOutcome {
    /// A report was submitted.
    Submitted(Box<Report>),
    /// The recording window was cancelled; nothing was submitted.
    Cancelled,
}

/// Device capabilities and settings the panic action runs with.
pub struct PanicAction<'a> {
    geolocation: &'a GeolocationProvider,
    audio: &'a mut AudioCaptureProvider,
    config: &'a PanicConfig,
}

impl<'a> PanicAction<'a> {
    /// Creates an action over the given providers.
    #[must_use]
    pub const fn new(
        geolocation: &'a GeolocationProvider,
        audio: &'a mut AudioCaptureProvider,
        config: &'a PanicConfig,
    ) -> Self {
        Self {
            geolocation,
            audio,
            config,
        }
    }

    /// Runs the action, bounding any recording by `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the store rejects the final report.
    pub async fn trigger(
        &mut self,
        store: &mut ReportStore,
        window: ScheduledWindow,
    ) -> Result<PanicOutcome, StoreError> {
        match self.audio.start_recording().await {
            Ok(()) => self.record_and_submit(store, window).await,
            Err(DeviceError::PermissionDenied(Capability::Audio)) => {
                log::warn!("Audio permission denied; submitting panic report without recording");
                self.submit_without_audio(store).await
            }
            Err(e) => {
                log::error!("Failed to start audio recording: {e}");
                self.submit_without_audio(store).await
            }
        }
    }

    async fn record_and_submit(
        &mut self,
        store: &mut ReportStore,
        window: ScheduledWindow,
    ) -> Result<PanicOutcome, StoreError> {
        log::info!(
            "Recording panic audio for {}s",
            window.duration().as_secs()
        );
        let (position, outcome) = tokio::join!(self.geolocation.get_position(), window.wait());

        if outcome == WindowOutcome::Cancelled {
            if let Err(e) = self.audio.stop_recording().await {
                log::warn!("Failed to stop cancelled recording: {e}");
            }
            log::info!("Panic action cancelled");
            return Ok(PanicOutcome::Cancelled);
        }

        let position = resolved(position);
        match self.audio.stop_recording().await {
            Ok(file) => {
                self.submit(store, self.config.description.clone(), position, Some(file))
                    .await
            }
            Err(e) => {
                log::error!("Failed to stop audio recording: {e}");
                self.submit(
                    store,
                    self.config.audio_error_description.clone(),
                    position,
                    None,
                )
                .await
            }
        }
    }

    async fn submit_without_audio(
        &self,
        store: &mut ReportStore,
    ) -> Result<PanicOutcome, StoreError> {
        let position = resolved(self.geolocation.get_position().await);
        self.submit(store, self.config.description.clone(), position, None)
            .await
    }

    async fn submit(
        &self,
        store: &mut ReportStore,
        description: String,
        position: Option<Position>,
        file: Option<FileAttachment>,
    ) -> Result<PanicOutcome, StoreError> {
        let draft = ReportDraft::new(self.config.report_type, description, self.config.urgency)
            .with_position(position)
            .with_file(file);
        let report = store.add_report(draft).await?;
        log::info!("Panic report {} submitted", report.id());
        Ok(PanicOutcome::Submitted(Box::new(report.clone())))
    }
}

fn resolved(position: Result<Position, DeviceError>) -> Option<Position> {
    match position {
        Ok(position) => Some(position),
        Err(e) => {
            log::warn!("Submitting panic report without position: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use panic_report_config::Config;
    use panic_report_device::audio::{FileAudioBackend, NoAudio, RecorderState};
    use panic_report_device::location::{FixedLocation, NoLocation};
    use panic_report_device::permission::{Permissions, StaticPrompt};
    use panic_report_models::{ReportType, Urgency};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{local_store, remote_store};

    struct Rig {
        tmp: tempfile::TempDir,
        store: ReportStore,
        geolocation: GeolocationProvider,
        audio: AudioCaptureProvider,
        config: PanicConfig,
    }

    fn rig(granted: &[Capability], with_source: bool, with_location: bool) -> Rig {
        let tmp = tempfile::tempdir().unwrap();
        let permissions = Arc::new(Permissions::new(Arc::new(StaticPrompt::granting(granted))));

        let source = tmp.path().join("mic.m4a");
        std::fs::write(&source, b"audio").unwrap();
        let backend: Box<dyn panic_report_device::audio::AudioBackend> = if with_source {
            Box::new(FileAudioBackend::new(source, tmp.path().join("recordings")))
        } else {
            Box::new(NoAudio)
        };
        let location: Arc<dyn panic_report_device::location::LocationSource> = if with_location {
            Arc::new(FixedLocation::new(-22.9068, -43.1729))
        } else {
            Arc::new(NoLocation)
        };

        Rig {
            store: local_store(tmp.path()),
            geolocation: GeolocationProvider::new(permissions.clone(), location),
            audio: AudioCaptureProvider::new(permissions, backend),
            config: Config::defaults().panic,
            tmp,
        }
    }

    fn short_window() -> ScheduledWindow {
        ScheduledWindow::start(Duration::from_millis(20)).0
    }

    fn submitted(outcome: PanicOutcome) -> Report {
        match outcome {
            PanicOutcome::Submitted(report) => *report,
            PanicOutcome::Cancelled => panic!("expected a submitted report"),
        }
    }

    #[tokio::test]
    async fn records_and_submits_panic_report() {
        let mut rig = rig(&[Capability::Audio, Capability::Location], true, true);
        let outcome = PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
            .trigger(&mut rig.store, short_window())
            .await
            .unwrap();

        let report = submitted(outcome);
        assert_eq!(report.report_type(), ReportType::Panic);
        assert_eq!(report.urgency(), Urgency::High);
        assert_eq!(report.description(), rig.config.description);
        assert!(report.position().is_some());
        let file = report.file().unwrap();
        assert!(file.name.starts_with("panic_audio_"));
        assert_eq!(file.mime_type, "audio/m4a");
        assert_eq!(rig.store.len(), 1);
        assert_eq!(rig.audio.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn without_audio_permission_submits_without_file() {
        let mut rig = rig(&[Capability::Location], true, true);
        let report = submitted(
            PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
                .trigger(&mut rig.store, short_window())
                .await
                .unwrap(),
        );

        assert!(report.file().is_none());
        assert!(report.position().is_some());
        assert_eq!(report.description(), rig.config.description);
    }

    #[tokio::test]
    async fn unavailable_recorder_submits_without_file() {
        let mut rig = rig(&[Capability::Audio, Capability::Location], false, true);
        let report = submitted(
            PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
                .trigger(&mut rig.store, short_window())
                .await
                .unwrap(),
        );
        assert!(report.file().is_none());
    }

    #[tokio::test]
    async fn failed_stop_marks_description() {
        let mut rig = rig(&[Capability::Audio, Capability::Location], true, true);
        // Removing the source between start and stop makes the copy fail.
        let source = rig.tmp.path().join("mic.m4a");
        let (window, _handle) = ScheduledWindow::start(Duration::from_millis(200));
        let remover = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            std::fs::remove_file(source).unwrap();
        });

        let report = submitted(
            PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
                .trigger(&mut rig.store, window)
                .await
                .unwrap(),
        );
        remover.await.unwrap();

        assert!(report.file().is_none());
        assert_eq!(report.description(), rig.config.audio_error_description);
    }

    #[tokio::test]
    async fn denied_location_submits_without_position() {
        let mut rig = rig(&[Capability::Audio], true, true);
        let report = submitted(
            PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
                .trigger(&mut rig.store, short_window())
                .await
                .unwrap(),
        );
        assert!(report.position().is_none());
        assert!(report.file().is_some());
    }

    #[tokio::test]
    async fn cancelled_window_submits_nothing() {
        let mut rig = rig(&[Capability::Audio, Capability::Location], true, true);
        let (window, handle) = ScheduledWindow::start(Duration::from_secs(30));
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel()
        });

        let outcome = PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
            .trigger(&mut rig.store, window)
            .await
            .unwrap();

        assert!(canceller.await.unwrap());
        assert_eq!(outcome, PanicOutcome::Cancelled);
        assert!(rig.store.is_empty());
        assert_eq!(rig.audio.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn denied_location_still_reaches_remote_with_null_position() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reports"))
            .and(body_string_contains("\"position\":null"))
            .and(body_string_contains("\"type\":\"panic\""))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut rig = rig(&[], false, false);
        rig.store = remote_store(&server.uri());

        let report = submitted(
            PanicAction::new(&rig.geolocation, &mut rig.audio, &rig.config)
                .trigger(&mut rig.store, short_window())
                .await
                .unwrap(),
        );
        assert!(report.position().is_none());
    }
}
