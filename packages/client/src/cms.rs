//! Wire types for the content API's `reports` collection.
//!
//! Records come back in the CMS entity shape: `{ id, attributes: {...} }`,
//! usually wrapped in a `{ data: [...] }` envelope. Attribute values are
//! kept as raw strings here; [`CmsReport::into_report`] classifies them.

use chrono::{DateTime, Utc};
use panic_report_models::{
    ClassificationError, DenunciationStatus, FileAttachment, Position, Report, ReportDraft,
    ReportType, Urgency,
};
use serde::{Deserialize, Serialize};

/// Record identifier; numeric in practice but tolerated as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CmsId {
    /// Numeric id.
    Number(i64),
    /// String id.
    Text(String),
}

impl std::fmt::Display for CmsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A report record as returned by the content API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsReport {
    /// Record id assigned by the CMS.
    pub id: Option<CmsId>,
    /// Record fields.
    pub attributes: CmsReportAttributes,
}

/// Fields of a report record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsReportAttributes {
    /// Abuse type slug.
    #[serde(rename = "type")]
    pub report_type: String,
    /// Free-text description.
    pub description: String,
    /// Urgency slug.
    pub urgency: String,
    /// Workflow status label.
    #[serde(default)]
    pub denunciation_status: Option<String>,
    /// When the report was made.
    #[serde(default)]
    pub report_time: Option<DateTime<Utc>>,
    /// `GeoJSON` Point, kept raw so a malformed position does not reject
    /// the whole record.
    #[serde(default)]
    pub position: Option<serde_json::Value>,
    /// Populated media relation.
    #[serde(default)]
    pub files: Option<CmsFiles>,
}

/// Populated media relation wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmsFiles {
    /// Related media entries; `null` when nothing is attached.
    #[serde(default)]
    pub data: Option<Vec<CmsFile>>,
}

/// A media entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsFile {
    /// Media id.
    pub id: Option<CmsId>,
    /// Media fields.
    pub attributes: CmsFileAttributes,
}

/// Fields of a media entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsFileAttributes {
    /// Path relative to the API base URL (or an absolute URL).
    pub url: String,
    /// Original file name.
    #[serde(default)]
    pub name: Option<String>,
    /// MIME type.
    #[serde(default)]
    pub mime: Option<String>,
}

impl CmsFileAttributes {
    /// Absolute URL of this media entry.
    #[must_use]
    pub fn absolute_url(&self, api_base: &str) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            self.url.clone()
        } else {
            format!("{}{}", api_base.trim_end_matches('/'), self.url)
        }
    }
}

/// Response to a list request: the usual envelope or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReportList {
    Envelope { data: Vec<CmsReport> },
    Bare(Vec<CmsReport>),
}

impl ReportList {
    pub(crate) fn into_vec(self) -> Vec<CmsReport> {
        match self {
            Self::Envelope { data } | Self::Bare(data) => data,
        }
    }
}

/// Response to a create request.
#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    pub data: Option<CmsReport>,
}

/// Error body: `{ "error": { "message": "..." } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

/// Body of a create request (`{ "data": { ... } }`).
#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    pub data: CreateFields<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateFields<'a> {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub description: &'a str,
    pub urgency: Urgency,
    pub position: Option<geojson::Geometry>,
    pub report_time: DateTime<Utc>,
    pub denunciation_status: DenunciationStatus,
}

impl<'a> CreateRequest<'a> {
    pub(crate) fn from_report(report: &'a Report) -> Self {
        Self {
            data: CreateFields {
                report_type: report.report_type(),
                description: report.description(),
                urgency: report.urgency(),
                position: report.position().map(Position::to_geojson),
                report_time: report.report_time(),
                denunciation_status: report.status(),
            },
        }
    }
}

impl CmsReport {
    /// Decodes the `GeoJSON` position, if present and well-formed.
    #[must_use]
    pub fn geometry(&self) -> Option<geojson::Geometry> {
        let value = self.attributes.position.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Classifies this record into a [`Report`].
    ///
    /// File URLs are made absolute against `api_base`; only the first file
    /// is kept. A missing report time falls back to `now`, and a missing
    /// status to [`DenunciationStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError`] if the type, urgency, or status is
    /// not recognized.
    pub fn into_report(
        self,
        api_base: &str,
        now: DateTime<Utc>,
    ) -> Result<Report, ClassificationError> {
        let report_type = ReportType::classify(&self.attributes.report_type)?;
        let urgency = Urgency::classify(&self.attributes.urgency)?;
        let status = self
            .attributes
            .denunciation_status
            .as_deref()
            .map(DenunciationStatus::classify)
            .transpose()?
            .unwrap_or_default();
        let report_time = self.attributes.report_time.unwrap_or(now);

        let position = self
            .geometry()
            .and_then(|g| Position::from_geojson(&g, report_time.timestamp_millis()));

        let file = self
            .attributes
            .files
            .as_ref()
            .and_then(|f| f.data.as_ref())
            .and_then(|files| files.first())
            .map(|f| FileAttachment {
                uri: f.attributes.absolute_url(api_base),
                name: f.attributes.name.clone().unwrap_or_default(),
                mime_type: f
                    .attributes
                    .mime
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            });

        let id = self.id.map(|id| id.to_string()).unwrap_or_default();
        let draft = ReportDraft::new(report_type, self.attributes.description, urgency)
            .with_position(position)
            .with_file(file)
            .with_report_time(report_time);

        let mut report = Report::from_draft(draft, id, now);
        // Records only ever come back at or after Pending.
        report
            .advance_status(status)
            .map_err(|_| ClassificationError::Status(status.to_string()))?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn record() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "attributes": {
                "type": "fisica",
                "description": "Vítima",
                "urgency": "critica",
                "denunciation_status": "Instruções Enviadas",
                "report_time": "2025-03-01T12:00:00.000Z",
                "position": { "type": "Point", "coordinates": [-34.861, -7.11532] },
                "files": {
                    "data": [{
                        "id": 3,
                        "attributes": {
                            "url": "/uploads/panic_audio_1.m4a",
                            "name": "panic_audio_1.m4a",
                            "mime": "audio/m4a"
                        }
                    }]
                }
            }
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn converts_full_record() {
        let cms: CmsReport = serde_json::from_value(record()).unwrap();
        let report = cms.into_report("http://cms.test/", now()).unwrap();

        assert_eq!(report.id(), "7");
        assert_eq!(report.report_type(), ReportType::PhysicalViolence);
        assert_eq!(report.urgency(), Urgency::Critical);
        assert_eq!(report.status(), DenunciationStatus::InstructionsSent);
        assert_eq!(
            report.report_time(),
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
        );

        let pos = report.position().unwrap();
        assert!((pos.latitude - -7.115_32).abs() < 1e-9);
        assert!((pos.longitude - -34.861).abs() < 1e-9);

        let file = report.file().unwrap();
        assert_eq!(file.uri, "http://cms.test/uploads/panic_audio_1.m4a");
        assert_eq!(file.mime_type, "audio/m4a");
    }

    #[test]
    fn sparse_record_uses_defaults() {
        let cms: CmsReport = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "attributes": {
                "type": "outro",
                "description": "x",
                "urgency": "baixa",
                "position": null,
                "files": { "data": null }
            }
        }))
        .unwrap();
        let report = cms.into_report("http://cms.test", now()).unwrap();

        assert_eq!(report.id(), "abc");
        assert_eq!(report.status(), DenunciationStatus::Pending);
        assert_eq!(report.report_time(), now());
        assert!(report.position().is_none());
        assert!(report.file().is_none());
    }

    #[test]
    fn unknown_urgency_fails_classification() {
        let mut value = record();
        value["attributes"]["urgency"] = serde_json::json!("gravissima");
        let cms: CmsReport = serde_json::from_value(value).unwrap();
        assert!(matches!(
            cms.into_report("http://cms.test", now()),
            Err(ClassificationError::Urgency(_))
        ));
    }

    #[test]
    fn malformed_position_is_dropped_not_fatal() {
        let mut value = record();
        value["attributes"]["position"] = serde_json::json!({ "latitude": 1, "longitude": 2 });
        let cms: CmsReport = serde_json::from_value(value).unwrap();
        let report = cms.into_report("http://cms.test", now()).unwrap();
        assert!(report.position().is_none());
    }

    #[test]
    fn list_accepts_envelope_and_bare_array() {
        let wrapped: ReportList =
            serde_json::from_value(serde_json::json!({ "data": [record()], "meta": {} })).unwrap();
        assert_eq!(wrapped.into_vec().len(), 1);

        let bare: ReportList = serde_json::from_value(serde_json::json!([record(), record()])).unwrap();
        assert_eq!(bare.into_vec().len(), 2);
    }

    #[test]
    fn create_request_encodes_geojson_and_slugs() {
        let draft = ReportDraft::new(ReportType::PhysicalViolence, "teste", Urgency::High)
            .with_position(Some(Position {
                latitude: -22.9068,
                longitude: -43.1729,
                timestamp: 0,
            }));
        let report = Report::from_draft(draft, "local", now());
        let json = serde_json::to_value(CreateRequest::from_report(&report)).unwrap();

        assert_eq!(json["data"]["type"], "fisica");
        assert_eq!(json["data"]["urgency"], "alta");
        assert_eq!(json["data"]["denunciation_status"], "Aguardando Resposta");
        assert_eq!(json["data"]["position"]["type"], "Point");
        assert_eq!(json["data"]["position"]["coordinates"][0], -43.1729);
    }

    #[test]
    fn create_request_sends_null_position() {
        let draft = ReportDraft::new(ReportType::Panic, "x", Urgency::High);
        let report = Report::from_draft(draft, "local", now());
        let json = serde_json::to_value(CreateRequest::from_report(&report)).unwrap();
        assert!(json["data"]["position"].is_null());
    }
}
