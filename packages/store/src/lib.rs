#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The process-wide report list and the flows that add to it.
//!
//! [`ReportStore`] is an explicit object owned by the composition root.
//! It holds the ordered list of reports and delegates durability to a
//! [`ReportBackend`]: either the on-device cache ([`LocalBackend`]) or the
//! remote content API ([`RemoteBackend`]).
//!
//! The [`panic`] module implements the panic action, [`sequence`] the
//! hidden-unlock gate that opens the report form, and [`form`] the form
//! submission path.

pub mod backend;
pub mod form;
pub mod panic;
pub mod sequence;

use chrono::Utc;
use panic_report_cache::CacheError;
use panic_report_client::SubmissionError;
use panic_report_device::DeviceError;
use panic_report_models::{Report, ReportDraft, ValidationError};
use thiserror::Error;

pub use backend::{LocalBackend, RemoteBackend, ReportBackend};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote API did not accept or return reports.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The local cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Form input was incomplete or unrecognized.
    #[error("Invalid report: {0}")]
    Validation(#[from] ValidationError),

    /// A device capability failed.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Ordered, in-memory list of reports backed by a durability backend.
///
/// The first [`ReportStore::add_report`] loads the backend's list if no
/// load was attempted yet, so an append never replaces reports the backend
/// already holds.
pub struct ReportStore {
    backend: Box<dyn ReportBackend>,
    reports: Vec<Report>,
    loaded: bool,
}

impl ReportStore {
    /// Creates an empty store over `backend`.
    #[must_use]
    pub fn new(backend: Box<dyn ReportBackend>) -> Self {
        Self {
            backend,
            reports: Vec::new(),
            loaded: false,
        }
    }

    /// Name of the active backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Populates the list from the backend, keeping the current list if
    /// that fails. Returns the number of reports held afterwards.
    ///
    /// A failed load still counts as attempted; later appends do not retry.
    pub async fn load(&mut self) -> usize {
        self.loaded = true;
        if let Err(e) = self.fetch_reports().await {
            log::error!("Failed to load reports from {} backend: {e}", self.backend.name());
        }
        self.reports.len()
    }

    /// Replaces the list with the backend's current contents.
    ///
    /// On failure the previous list is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot produce the list.
    pub async fn fetch_reports(&mut self) -> Result<usize, StoreError> {
        let reports = self.backend.load().await?;
        log::debug!(
            "Loaded {} reports from {} backend",
            reports.len(),
            self.backend.name()
        );
        self.reports = reports;
        self.loaded = true;
        Ok(self.reports.len())
    }

    /// Builds a [`Report`] from `draft` and makes it durable.
    ///
    /// The report starts as pending with a fresh id; its report time is the
    /// draft's or now. It is appended after the backend accepts it, so the
    /// list stays in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the report; nothing is
    /// appended in that case.
    pub async fn add_report(&mut self, draft: ReportDraft) -> Result<&Report, StoreError> {
        if !self.loaded {
            self.load().await;
        }

        let report = Report::from_draft(draft, uuid::Uuid::new_v4().to_string(), Utc::now());
        log::debug!(
            "Adding {} report ({}) via {} backend",
            report.report_type(),
            report.urgency(),
            self.backend.name()
        );

        let report = self.backend.submit(report).await?;
        let index = self.reports.len();
        self.reports.push(report);
        self.backend.persist(&self.reports).await;

        Ok(&self.reports[index])
    }

    /// Reports in submission order.
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Number of reports held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether no reports are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
