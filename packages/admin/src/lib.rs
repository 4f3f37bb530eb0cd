#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Admin dashboard model.
//!
//! Turns fetched CMS records into [`Incident`]s classified by urgency
//! [`Level`], and filters or counts them per level.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use panic_report_client::cms::CmsReport;
use panic_report_models::{ClassificationError, DenunciationStatus, ReportType, Urgency};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Dashboard urgency filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumIter,
    AsRefStr,
)]
pub enum Level {
    /// No filtering.
    #[strum(to_string = "Todos")]
    All,
    /// Crítica
    #[strum(to_string = "Crítica")]
    Critical,
    /// Alta
    #[strum(to_string = "Alta")]
    High,
    /// Média
    #[strum(to_string = "Média")]
    Medium,
    /// Baixa
    #[strum(to_string = "Baixa")]
    Low,
}

impl From<Urgency> for Level {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Critical => Self::Critical,
            Urgency::High => Self::High,
            Urgency::Medium => Self::Medium,
            Urgency::Low => Self::Low,
        }
    }
}

impl Level {
    /// Classifies a raw urgency name (`"critica"` → [`Level::Critical`]).
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Urgency`] for an unknown name.
    pub fn from_urgency_name(name: &str) -> Result<Self, ClassificationError> {
        Urgency::classify(name).map(Self::from)
    }

    /// Whether an incident at `level` passes this filter.
    #[must_use]
    pub fn admits(self, level: Self) -> bool {
        self == Self::All || self == level
    }
}

/// A media asset attached to an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Absolute URL.
    pub uri: String,
    /// File name.
    pub name: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
}

/// A classified record as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    /// Record id as the server reports it.
    pub id: String,
    /// Urgency level; never [`Level::All`].
    pub level: Level,
    /// Follow-up status, pending when the record has none.
    pub status: DenunciationStatus,
    /// Abuse type.
    pub report_type: ReportType,
    /// When the report was made, if the record carries a time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-text description.
    pub description: String,
    /// Latitude in degrees, zero without a position.
    pub latitude: f64,
    /// Longitude in degrees, zero without a position.
    pub longitude: f64,
    /// Every attached file.
    pub assets: Vec<Asset>,
}

impl Incident {
    /// Classifies a fetched record.
    ///
    /// Coordinates come from the `GeoJSON` Point (`[lon, lat]`) and are
    /// zero when absent. Asset URLs are made absolute against `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError`] if the urgency, type, or status is
    /// not recognized.
    pub fn from_record(record: &CmsReport, api_base: &str) -> Result<Self, ClassificationError> {
        let attributes = &record.attributes;
        let level = Level::from_urgency_name(&attributes.urgency)?;
        let report_type = ReportType::classify(&attributes.report_type)?;
        let status = attributes
            .denunciation_status
            .as_deref()
            .map(DenunciationStatus::classify)
            .transpose()?
            .unwrap_or_default();

        let (longitude, latitude) = match record.geometry().map(|g| g.value) {
            Some(geojson::Value::Point(coords)) if coords.len() >= 2 => {
                (coords[0], coords[1])
            }
            _ => (0.0, 0.0),
        };

        let assets = attributes
            .files
            .as_ref()
            .and_then(|files| files.data.as_ref())
            .map(|files| {
                files
                    .iter()
                    .map(|file| Asset {
                        uri: file.attributes.absolute_url(api_base),
                        name: file.attributes.name.clone().unwrap_or_default(),
                        mime_type: file.attributes.mime.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            id: record.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            level,
            status,
            report_type,
            timestamp: attributes.report_time,
            description: attributes.description.clone(),
            latitude,
            longitude,
            assets,
        })
    }
}

/// Classified incidents in fetch order.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    incidents: Vec<Incident>,
}

impl Dashboard {
    /// Classifies every record.
    ///
    /// # Errors
    ///
    /// Returns the [`ClassificationError`] of the first record that cannot
    /// be classified.
    pub fn from_records(records: &[CmsReport], api_base: &str) -> Result<Self, ClassificationError> {
        let incidents = records
            .iter()
            .map(|record| Incident::from_record(record, api_base))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("Classified {} incidents", incidents.len());
        Ok(Self { incidents })
    }

    /// All incidents.
    #[must_use]
    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Incidents passing the `level` filter, in fetch order.
    pub fn filter(&self, level: Level) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().filter(move |i| level.admits(i.level))
    }

    /// Number of incidents per level, including [`Level::All`].
    #[must_use]
    pub fn counts(&self) -> BTreeMap<Level, usize> {
        use strum::IntoEnumIterator as _;

        Level::iter()
            .map(|level| (level, self.filter(level).count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, urgency: &str) -> CmsReport {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "attributes": {
                "type": "assedio-moral",
                "description": format!("incident {id}"),
                "urgency": urgency,
                "report_time": "2025-03-01T12:00:00Z",
                "position": { "type": "Point", "coordinates": [-34.861, -7.115] },
                "files": { "data": [
                    { "id": 1, "attributes": { "url": "/uploads/a.m4a", "name": "a.m4a", "mime": "audio/m4a" } },
                    { "id": 2, "attributes": { "url": "/uploads/b.jpg", "name": "b.jpg" } }
                ]}
            }
        }))
        .unwrap()
    }

    #[test]
    fn critica_is_critical() {
        assert_eq!(Level::from_urgency_name("critica").unwrap(), Level::Critical);
        assert_eq!(Level::from_urgency_name(" Crítica ").unwrap(), Level::Critical);
        assert_eq!(Level::from_urgency_name("media").unwrap(), Level::Medium);
    }

    #[test]
    fn level_labels_in_filter_order() {
        use strum::IntoEnumIterator as _;

        let labels: Vec<String> = Level::iter().map(|level| level.to_string()).collect();
        assert_eq!(labels, ["Todos", "Crítica", "Alta", "Média", "Baixa"]);
    }

    #[test]
    fn unknown_urgency_is_an_error() {
        assert!(matches!(
            Level::from_urgency_name("extrema"),
            Err(ClassificationError::Urgency(_))
        ));
    }

    #[test]
    fn incident_maps_position_and_assets() {
        let incident = Incident::from_record(&record(5, "alta"), "http://cms.test").unwrap();

        assert_eq!(incident.id, "5");
        assert_eq!(incident.level, Level::High);
        assert_eq!(incident.report_type, ReportType::MoralHarassment);
        assert_eq!(incident.status, DenunciationStatus::Pending);
        assert!((incident.latitude - -7.115).abs() < 1e-9);
        assert!((incident.longitude - -34.861).abs() < 1e-9);
        assert_eq!(incident.assets.len(), 2);
        assert_eq!(incident.assets[0].uri, "http://cms.test/uploads/a.m4a");
        assert_eq!(incident.assets[1].mime_type, None);
    }

    #[test]
    fn missing_position_is_zero() {
        let mut rec = record(1, "baixa");
        rec.attributes.position = None;
        let incident = Incident::from_record(&rec, "http://cms.test").unwrap();
        assert!(incident.latitude.abs() < f64::EPSILON);
        assert!(incident.longitude.abs() < f64::EPSILON);
    }

    #[test]
    fn dashboard_fails_on_first_bad_record() {
        let records = [record(1, "alta"), record(2, "???"), record(3, "baixa")];
        assert!(Dashboard::from_records(&records, "http://cms.test").is_err());
    }

    #[test]
    fn filter_and_counts() {
        let records = [
            record(1, "critica"),
            record(2, "alta"),
            record(3, "critica"),
            record(4, "baixa"),
        ];
        let dashboard = Dashboard::from_records(&records, "http://cms.test").unwrap();

        let critical: Vec<_> = dashboard
            .filter(Level::Critical)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(critical, ["1", "3"]);
        assert_eq!(dashboard.filter(Level::All).count(), 4);

        let counts = dashboard.counts();
        assert_eq!(counts[&Level::All], 4);
        assert_eq!(counts[&Level::Critical], 2);
        assert_eq!(counts[&Level::High], 1);
        assert_eq!(counts[&Level::Medium], 0);
        assert_eq!(counts[&Level::Low], 1);
    }
}
