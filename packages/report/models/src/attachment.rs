//! Data attached to a report: a geographic position and at most one file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type used for panic-action audio recordings.
pub const AUDIO_MIME_TYPE: &str = "audio/m4a";

/// A single-shot device position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// When the fix was taken, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Position {
    /// Encodes this position as a `GeoJSON` Point (`[lon, lat]` order).
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Point(vec![self.longitude, self.latitude]))
    }

    /// Decodes a `GeoJSON` Point back into a position.
    ///
    /// `GeoJSON` carries no fix time, so the caller supplies one. Returns
    /// `None` for anything other than a Point with at least two coordinates.
    #[must_use]
    pub fn from_geojson(geometry: &geojson::Geometry, timestamp: i64) -> Option<Self> {
        match &geometry.value {
            geojson::Value::Point(coords) if coords.len() >= 2 => Some(Self {
                latitude: coords[1],
                longitude: coords[0],
                timestamp,
            }),
            _ => None,
        }
    }
}

/// A generic file attachment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    /// Location of the asset (a filesystem path or URL).
    pub uri: String,
    /// Display file name.
    pub name: String,
    /// MIME type of the asset.
    pub mime_type: String,
}

impl FileAttachment {
    /// Wraps a freshly recorded audio asset.
    ///
    /// The file is named `panic_audio_<epoch millis>.m4a` after the time the
    /// recording was stopped.
    #[must_use]
    pub fn audio_recording(uri: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            uri: uri.into(),
            name: format!("panic_audio_{}.m4a", recorded_at.timestamp_millis()),
            mime_type: AUDIO_MIME_TYPE.to_string(),
        }
    }
}
