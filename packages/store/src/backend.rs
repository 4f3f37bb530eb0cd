//! Durability backends for [`crate::ReportStore`].

use async_trait::async_trait;
use panic_report_cache::LocalReportCache;
use panic_report_client::ReportClient;
use panic_report_models::Report;

use crate::StoreError;

/// Makes reports durable and loads the persisted list.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    /// Short name used in log lines (e.g. `"local"`).
    fn name(&self) -> &'static str;

    /// Loads the persisted report list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the list cannot be obtained.
    async fn load(&self) -> Result<Vec<Report>, StoreError>;

    /// Hands a new report to the backend before it joins the list.
    ///
    /// Returns the report as it should be held, e.g. with a server id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the report was not accepted.
    async fn submit(&self, report: Report) -> Result<Report, StoreError>;

    /// Persists the full list after a report was appended. Failures are
    /// logged; the in-memory list stays authoritative for the session.
    async fn persist(&self, reports: &[Report]);
}

/// Offline-first backend writing the whole list to the on-device cache.
pub struct LocalBackend {
    cache: LocalReportCache,
}

impl LocalBackend {
    /// Wraps `cache`.
    #[must_use]
    pub const fn new(cache: LocalReportCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl ReportBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.cache.load().await)
    }

    async fn submit(&self, report: Report) -> Result<Report, StoreError> {
        Ok(report)
    }

    async fn persist(&self, reports: &[Report]) {
        if let Err(e) = self.cache.save(reports).await {
            log::error!("Failed to save report cache: {e}");
        }
    }
}

/// Server-backed backend posting each report to the content API.
pub struct RemoteBackend {
    client: ReportClient,
}

impl RemoteBackend {
    /// Wraps `client`.
    #[must_use]
    pub const fn new(client: ReportClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.client.fetch_reports().await?)
    }

    async fn submit(&self, report: Report) -> Result<Report, StoreError> {
        let created = self.client.add_report(&report).await?;
        Ok(match created.and_then(|record| record.id) {
            Some(id) => report.with_id(id.to_string()),
            None => report,
        })
    }

    async fn persist(&self, _reports: &[Report]) {}
}
