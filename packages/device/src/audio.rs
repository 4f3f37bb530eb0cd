//! Audio capture provider.
//!
//! [`AudioCaptureProvider::start_recording`] puts the recorder into the
//! [`RecorderState::Recording`] state; [`AudioCaptureProvider::stop_recording`]
//! finishes the capture and wraps the recorded asset in a
//! [`FileAttachment`].

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use panic_report_models::FileAttachment;

use crate::permission::Permissions;
use crate::{Capability, DeviceError};

/// Low-level recorder driven by [`AudioCaptureProvider`].
#[async_trait]
pub trait AudioBackend: Send {
    /// Prepares the recorder (allocates buffers, opens the output).
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the recorder cannot be prepared.
    async fn prepare(&mut self) -> Result<(), DeviceError>;

    /// Starts capturing. Must follow a successful [`Self::prepare`].
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if capture cannot start.
    fn record(&mut self) -> Result<(), DeviceError>;

    /// Stops capturing and returns the URI of the recorded asset.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the recording cannot be finalized.
    async fn stop(&mut self) -> Result<String, DeviceError>;
}

/// Recorder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not capturing.
    Idle,
    /// Capture in progress.
    Recording,
}

/// Permission-gated audio capture.
pub struct AudioCaptureProvider {
    permissions: Arc<Permissions>,
    backend: Box<dyn AudioBackend>,
    state: RecorderState,
}

impl AudioCaptureProvider {
    /// Creates an idle provider over `backend` gated by `permissions`.
    #[must_use]
    pub fn new(permissions: Arc<Permissions>, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            permissions,
            backend,
            state: RecorderState::Idle,
        }
    }

    /// Current recorder state.
    #[must_use]
    pub const fn state(&self) -> RecorderState {
        self.state
    }

    /// Requests audio permission if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::PermissionDenied`] if permission is refused.
    pub async fn ensure_permission(&self) -> Result<(), DeviceError> {
        self.permissions.ensure(Capability::Audio).await
    }

    /// Prepares the recorder and starts capturing.
    ///
    /// # Errors
    ///
    /// * [`DeviceError::PermissionDenied`] if audio permission is refused
    /// * [`DeviceError::AlreadyRecording`] if a capture is in progress
    /// * any error from the backend while preparing or starting
    pub async fn start_recording(&mut self) -> Result<(), DeviceError> {
        self.ensure_permission().await?;
        if self.state == RecorderState::Recording {
            return Err(DeviceError::AlreadyRecording);
        }

        self.backend.prepare().await?;
        self.backend.record()?;
        self.state = RecorderState::Recording;
        log::info!("Audio recording started");
        Ok(())
    }

    /// Stops the active capture and wraps the recorded asset.
    ///
    /// The recorder returns to [`RecorderState::Idle`] even if the backend
    /// fails to finalize the file.
    ///
    /// # Errors
    ///
    /// * [`DeviceError::NotRecording`] if no capture is active
    /// * any error from the backend while stopping
    pub async fn stop_recording(&mut self) -> Result<FileAttachment, DeviceError> {
        if self.state != RecorderState::Recording {
            return Err(DeviceError::NotRecording);
        }
        self.state = RecorderState::Idle;

        let uri = self.backend.stop().await?;
        log::info!("Audio recording stopped: {uri}");
        Ok(FileAttachment::audio_recording(uri, Utc::now()))
    }
}

/// Desktop stand-in for a microphone: "records" by copying a prepared
/// audio file into the capture directory when the recording stops.
pub struct FileAudioBackend {
    source: PathBuf,
    capture_dir: PathBuf,
    started_at: Option<DateTime<Utc>>,
}

impl FileAudioBackend {
    /// Creates a backend replaying `source` into `capture_dir`.
    #[must_use]
    pub const fn new(source: PathBuf, capture_dir: PathBuf) -> Self {
        Self {
            source,
            capture_dir,
            started_at: None,
        }
    }
}

#[async_trait]
impl AudioBackend for FileAudioBackend {
    async fn prepare(&mut self) -> Result<(), DeviceError> {
        if !tokio::fs::try_exists(&self.source).await? {
            return Err(DeviceError::Unavailable {
                capability: Capability::Audio,
                message: format!("audio source {} does not exist", self.source.display()),
            });
        }
        tokio::fs::create_dir_all(&self.capture_dir).await?;
        Ok(())
    }

    fn record(&mut self) -> Result<(), DeviceError> {
        self.started_at = Some(Utc::now());
        Ok(())
    }

    async fn stop(&mut self) -> Result<String, DeviceError> {
        let started_at = self.started_at.take().ok_or(DeviceError::NotRecording)?;
        let dest = self
            .capture_dir
            .join(format!("recording_{}.m4a", started_at.timestamp_millis()));
        tokio::fs::copy(&self.source, &dest).await?;
        Ok(dest.to_string_lossy().into_owned())
    }
}

/// Backend for devices without a microphone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAudio;

#[async_trait]
impl AudioBackend for NoAudio {
    async fn prepare(&mut self) -> Result<(), DeviceError> {
        Err(DeviceError::Unavailable {
            capability: Capability::Audio,
            message: "no audio source configured".to_string(),
        })
    }

    fn record(&mut self) -> Result<(), DeviceError> {
        Err(DeviceError::NotRecording)
    }

    async fn stop(&mut self) -> Result<String, DeviceError> {
        Err(DeviceError::NotRecording)
    }
}
