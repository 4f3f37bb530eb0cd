//! Geolocation provider.
//!
//! [`GeolocationProvider::get_position`] asks for foreground location
//! permission if it has not been granted yet, then performs one
//! highest-accuracy fix. There is no retry; callers decide whether a report
//! goes out without a position.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use panic_report_models::Position;

use crate::permission::Permissions;
use crate::{Capability, DeviceError};

/// Something that can produce a position fix.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Takes a single fix at the best accuracy the hardware offers.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Unavailable`] if no fix can be produced.
    async fn current_position(&self) -> Result<Position, DeviceError>;
}

/// A source that always reports the same coordinates, stamped with the
/// time of the request.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    latitude: f64,
    longitude: f64,
}

impl FixedLocation {
    /// Creates a source pinned to the given coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Position, DeviceError> {
        Ok(Position {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}

/// A source for devices without location hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn current_position(&self) -> Result<Position, DeviceError> {
        Err(DeviceError::Unavailable {
            capability: Capability::Location,
            message: "no location source configured".to_string(),
        })
    }
}

/// Proof that location permission was granted; yields position fixes.
pub struct LocationCapability<'a> {
    source: &'a dyn LocationSource,
}

impl LocationCapability<'_> {
    /// Takes one highest-accuracy fix.
    ///
    /// # Errors
    ///
    /// Propagates [`DeviceError`] from the underlying source.
    pub async fn current_position(&self) -> Result<Position, DeviceError> {
        self.source.current_position().await
    }
}

/// Permission-gated access to a [`LocationSource`].
#[derive(Clone)]
pub struct GeolocationProvider {
    permissions: Arc<Permissions>,
    source: Arc<dyn LocationSource>,
}

impl GeolocationProvider {
    /// Creates a provider over `source` gated by `permissions`.
    #[must_use]
    pub fn new(permissions: Arc<Permissions>, source: Arc<dyn LocationSource>) -> Self {
        Self {
            permissions,
            source,
        }
    }

    /// Obtains the location capability, requesting permission if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::PermissionDenied`] if permission is refused.
    pub async fn capability(&self) -> Result<LocationCapability<'_>, DeviceError> {
        self.permissions.ensure(Capability::Location).await?;
        Ok(LocationCapability {
            source: self.source.as_ref(),
        })
    }

    /// Requests permission if needed, then takes one highest-accuracy fix.
    ///
    /// # Errors
    ///
    /// * [`DeviceError::PermissionDenied`] if permission is refused
    /// * [`DeviceError::Unavailable`] if the source cannot produce a fix
    pub async fn get_position(&self) -> Result<Position, DeviceError> {
        let position = self.capability().await?.current_position().await?;
        log::debug!(
            "Position fix: lat={} lon={} t={}",
            position.latitude,
            position.longitude,
            position.timestamp
        );
        Ok(position)
    }
}
