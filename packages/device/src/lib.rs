#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Device capabilities used to enrich a report.
//!
//! Every capability sits behind a permission gate. Access goes through
//! factory functions on [`permission::Permissions`] that either hand back a
//! usable capability or fail with [`DeviceError::PermissionDenied`]; nothing
//! here silently substitutes a default value.
//!
//! - [`location`]: single-shot, highest-accuracy position fixes.
//! - [`audio`]: start/stop audio capture producing a file attachment.
//! - [`window`]: the cancellable recording window that bounds a capture.

pub mod audio;
pub mod location;
pub mod permission;
pub mod window;

use thiserror::Error;

/// A permission-gated device capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Foreground location.
    Location,
    /// Audio recording.
    Audio,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Location => "location",
            Self::Audio => "audio recording",
        })
    }
}

/// Errors from device capability access.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The user (or policy) refused the permission.
    #[error("Permission denied: {0}")]
    PermissionDenied(Capability),

    /// `stop_recording` was called with no active recording.
    #[error("No active recording")]
    NotRecording,

    /// `start_recording` was called while already recording.
    #[error("Recording already in progress")]
    AlreadyRecording,

    /// The capability is granted but the hardware could not deliver.
    #[error("{capability} unavailable: {message}")]
    Unavailable {
        /// Which capability failed.
        capability: Capability,
        /// Description of what went wrong.
        message: String,
    },

    /// File I/O while materializing a capture failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
