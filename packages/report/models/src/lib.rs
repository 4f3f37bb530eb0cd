#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report data model shared by every panic-report crate.
//!
//! Defines the abuse-type and urgency taxonomy, the denunciation status
//! lifecycle, and the [`Report`] entity itself. Raw strings coming from
//! forms or the remote content API are classified strictly: anything that
//! does not map onto a known variant is rejected with a
//! [`ClassificationError`] instead of being silently defaulted.

pub mod attachment;
pub mod report;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use attachment::{FileAttachment, Position};
pub use report::{Report, ReportDraft, ReportForm, RequiredField, ValidationError};

/// Error returned when a raw string does not map to a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// The urgency name is not one of `baixa`, `media`, `alta`, `critica`.
    #[error("unrecognized urgency {0:?}")]
    Urgency(String),

    /// The report type is not part of the abuse taxonomy.
    #[error("unrecognized report type {0:?}")]
    ReportType(String),

    /// The denunciation status is not a known workflow state.
    #[error("unrecognized denunciation status {0:?}")]
    Status(String),
}

/// Severity classification of a report.
///
/// Wire values are the lowercase Portuguese slugs used by the report form
/// (`baixa`, `media`, `alta`, `critica`). Parsing is case-insensitive and
/// also accepts the accented spellings.
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
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Urgency {
    /// Baixa
    #[serde(rename = "baixa")]
    #[strum(to_string = "baixa")]
    Low,
    /// Média
    #[serde(rename = "media", alias = "média")]
    #[strum(to_string = "media", serialize = "média", serialize = "MÉDIA")]
    Medium,
    /// Alta
    #[serde(rename = "alta")]
    #[strum(to_string = "alta")]
    High,
    /// Crítica
    #[serde(rename = "critica", alias = "crítica")]
    #[strum(to_string = "critica", serialize = "crítica", serialize = "CRÍTICA")]
    Critical,
}

impl Urgency {
    /// Classifies a raw urgency name, ignoring surrounding whitespace and
    /// letter case.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Urgency`] for any unrecognized name.
    pub fn classify(name: &str) -> Result<Self, ClassificationError> {
        Self::from_str(name.trim()).map_err(|_| ClassificationError::Urgency(name.to_string()))
    }

    /// Human-readable label as shown in the report form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Baixa",
            Self::Medium => "Média",
            Self::High => "Alta",
            Self::Critical => "Crítica",
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

/// Category of abuse being reported.
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
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ReportType {
    /// Violência física
    #[serde(rename = "fisica")]
    #[strum(to_string = "fisica")]
    PhysicalViolence,
    /// Assédio moral
    #[serde(rename = "assedio-moral")]
    #[strum(to_string = "assedio-moral")]
    MoralHarassment,
    /// Assédio sexual
    #[serde(rename = "assedio-sexual")]
    #[strum(to_string = "assedio-sexual")]
    SexualHarassment,
    /// Negligência
    #[serde(rename = "negligencia")]
    #[strum(to_string = "negligencia")]
    Neglect,
    /// Outro
    #[serde(rename = "outro")]
    #[strum(to_string = "outro")]
    Other,
    /// Raised by the hidden panic action rather than the form.
    #[serde(rename = "panic")]
    #[strum(to_string = "panic")]
    Panic,
}

impl ReportType {
    /// Classifies a raw report type, ignoring surrounding whitespace and
    /// letter case.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::ReportType`] for any unrecognized name.
    pub fn classify(name: &str) -> Result<Self, ClassificationError> {
        Self::from_str(name.trim()).map_err(|_| ClassificationError::ReportType(name.to_string()))
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PhysicalViolence => "Violência física",
            Self::MoralHarassment => "Assédio moral",
            Self::SexualHarassment => "Assédio sexual",
            Self::Neglect => "Negligência",
            Self::Other => "Outro",
            Self::Panic => "Pânico",
        }
    }

    /// Types selectable from the report form (excludes [`Self::Panic`]).
    #[must_use]
    pub const fn form_choices() -> &'static [Self] {
        &[
            Self::PhysicalViolence,
            Self::MoralHarassment,
            Self::SexualHarassment,
            Self::Neglect,
            Self::Other,
        ]
    }
}

/// Workflow state of a report.
///
/// Ordering follows the lifecycle, so `Pending < InstructionsSent`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DenunciationStatus {
    /// Aguardando Resposta
    #[default]
    #[serde(rename = "Aguardando Resposta")]
    #[strum(to_string = "Aguardando Resposta")]
    Pending,
    /// Instruções Enviadas
    #[serde(rename = "Instruções Enviadas")]
    #[strum(to_string = "Instruções Enviadas")]
    InstructionsSent,
}

impl DenunciationStatus {
    /// Classifies a raw status string.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Status`] for any unrecognized value.
    pub fn classify(name: &str) -> Result<Self, ClassificationError> {
        Self::from_str(name.trim()).map_err(|_| ClassificationError::Status(name.to_string()))
    }
}

/// Error returned when a status change would move a report backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move report status from {from} back to {to}")]
pub struct StatusTransitionError {
    /// Current status.
    pub from: DenunciationStatus,
    /// Requested status.
    pub to: DenunciationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_classification_is_lenient_on_case_and_whitespace() {
        assert_eq!(Urgency::classify("critica").unwrap(), Urgency::Critical);
        assert_eq!(Urgency::classify(" Alta ").unwrap(), Urgency::High);
        assert_eq!(Urgency::classify("BAIXA").unwrap(), Urgency::Low);
        assert_eq!(Urgency::classify("média").unwrap(), Urgency::Medium);
        assert_eq!(Urgency::classify("crítica").unwrap(), Urgency::Critical);
    }

    #[test]
    fn unknown_urgency_is_rejected() {
        assert_eq!(
            Urgency::classify("urgentissima"),
            Err(ClassificationError::Urgency("urgentissima".to_string()))
        );
        assert!(Urgency::classify("").is_err());
    }

    #[test]
    fn urgency_serializes_as_slug() {
        assert_eq!(serde_json::to_string(&Urgency::High).unwrap(), "\"alta\"");
        assert_eq!(Urgency::Critical.to_string(), "critica");
        let parsed: Urgency = serde_json::from_str("\"média\"").unwrap();
        assert_eq!(parsed, Urgency::Medium);
    }

    #[test]
    fn report_type_slugs() {
        assert_eq!(ReportType::classify("fisica").unwrap(), ReportType::PhysicalViolence);
        assert_eq!(
            ReportType::classify("Assedio-Sexual").unwrap(),
            ReportType::SexualHarassment
        );
        assert_eq!(ReportType::classify("Panic").unwrap(), ReportType::Panic);
        assert_eq!(
            serde_json::to_string(&ReportType::MoralHarassment).unwrap(),
            "\"assedio-moral\""
        );
        assert!(ReportType::classify("roubo").is_err());
    }

    #[test]
    fn status_round_trips_portuguese_labels() {
        assert_eq!(
            DenunciationStatus::classify("Instruções Enviadas").unwrap(),
            DenunciationStatus::InstructionsSent
        );
        assert_eq!(DenunciationStatus::default(), DenunciationStatus::Pending);
        assert_eq!(
            serde_json::to_string(&DenunciationStatus::Pending).unwrap(),
            "\"Aguardando Resposta\""
        );
        assert!(DenunciationStatus::Pending < DenunciationStatus::InstructionsSent);
    }
}
