//! The [`Report`] entity and the drafts and forms it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ClassificationError, DenunciationStatus, FileAttachment, Position, ReportType,
    StatusTransitionError, Urgency,
};

/// A required report form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequiredField {
    /// Abuse type.
    ReportType,
    /// Free-text description.
    Description,
    /// Urgency selection.
    Urgency,
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ReportType => "type",
            Self::Description => "description",
            Self::Urgency => "urgency",
        })
    }
}

/// Errors from validating raw form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields were left empty.
    #[error("missing required fields: {}", format_fields(.0))]
    Missing(Vec<RequiredField>),

    /// A field was filled with a value outside the taxonomy.
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

fn format_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw, unvalidated input from the report form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    /// Selected abuse type slug.
    pub report_type: String,
    /// User-entered description.
    pub description: String,
    /// Selected urgency slug.
    pub urgency: String,
}

impl ReportForm {
    /// Checks that every required field is filled and classifies the
    /// selections, producing a draft with no position or file yet.
    ///
    /// All empty fields are reported together so the caller can flag each
    /// of them at once.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::Missing`] if any required field is blank
    /// * [`ValidationError::Classification`] if a selection is unknown
    pub fn validate(&self) -> Result<ReportDraft, ValidationError> {
        let mut missing = Vec::new();
        if self.report_type.trim().is_empty() {
            missing.push(RequiredField::ReportType);
        }
        if self.description.trim().is_empty() {
            missing.push(RequiredField::Description);
        }
        if self.urgency.trim().is_empty() {
            missing.push(RequiredField::Urgency);
        }
        if !missing.is_empty() {
            return Err(ValidationError::Missing(missing));
        }

        Ok(ReportDraft::new(
            ReportType::classify(&self.report_type)?,
            self.description.trim(),
            Urgency::classify(&self.urgency)?,
        ))
    }
}

/// Caller-supplied report content before it is stamped into a [`Report`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    /// Abuse category.
    pub report_type: ReportType,
    /// Free-text description.
    pub description: String,
    /// Severity.
    pub urgency: Urgency,
    /// Where the report was made, if known.
    pub position: Option<Position>,
    /// Optional attachment.
    pub file: Option<FileAttachment>,
    /// Explicit report time; defaults to creation time when `None`.
    pub report_time: Option<DateTime<Utc>>,
}

impl ReportDraft {
    /// Creates a draft without position, file, or explicit time.
    #[must_use]
    pub fn new(report_type: ReportType, description: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            report_type,
            description: description.into(),
            urgency,
            position: None,
            file: None,
            report_time: None,
        }
    }

    /// Sets the position.
    #[must_use]
    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    /// Sets the attachment.
    #[must_use]
    pub fn with_file(mut self, file: Option<FileAttachment>) -> Self {
        self.file = file;
        self
    }

    /// Sets an explicit report time.
    #[must_use]
    pub fn with_report_time(mut self, report_time: DateTime<Utc>) -> Self {
        self.report_time = Some(report_time);
        self
    }
}

/// A single submitted incident record.
///
/// Content is fixed at creation. The only state change allowed afterwards
/// is the forward move of [`DenunciationStatus`] via
/// [`Report::advance_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    id: String,
    #[serde(rename = "type")]
    report_type: ReportType,
    description: String,
    urgency: Urgency,
    position: Option<Position>,
    file: Option<FileAttachment>,
    #[serde(default)]
    status: DenunciationStatus,
    report_time: DateTime<Utc>,
}

impl Report {
    /// Stamps a draft into a report with status
    /// [`DenunciationStatus::Pending`], using `now` as the report time unless
    /// the draft already carries one.
    #[must_use]
    pub fn from_draft(draft: ReportDraft, id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            report_type: draft.report_type,
            description: draft.description,
            urgency: draft.urgency,
            position: draft.position,
            file: draft.file,
            status: DenunciationStatus::Pending,
            report_time: draft.report_time.unwrap_or(now),
        }
    }

    /// Replaces the identifier with one assigned by a persisting layer
    /// (e.g. the id returned by the remote content API).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Moves the status forward.
    ///
    /// Moving to the current status is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError`] if `next` precedes the current
    /// status.
    pub fn advance_status(&mut self, next: DenunciationStatus) -> Result<(), StatusTransitionError> {
        if next < self.status {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Identifier assigned by the persisting layer.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Abuse category.
    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Severity.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Position, if one was attached.
    #[must_use]
    pub const fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Attachment, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&FileAttachment> {
        self.file.as_ref()
    }

    /// Current workflow state.
    #[must_use]
    pub const fn status(&self) -> DenunciationStatus {
        self.status
    }

    /// When the report was made.
    #[must_use]
    pub const fn report_time(&self) -> DateTime<Utc> {
        self.report_time
    }
}
