#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the remote content API's `reports` collection.
//!
//! Submission posts a `{ "data": { ... } }` body. Reports with an audio
//! attachment go as `multipart/form-data`: a `data` text part carrying the
//! same JSON and a `files.files` part carrying the recording bytes.
//!
//! Non-2xx responses become [`SubmissionError::ServerRejected`] with the
//! server's `error.message` when the body has one.

pub mod cms;

use std::path::PathBuf;

use chrono::Utc;
use panic_report_config::ApiConfig;
use panic_report_models::{ClassificationError, FileAttachment, Report};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart;
use thiserror::Error;

use crate::cms::{CmsReport, Created, CreateRequest, ErrorBody, ReportList};

/// Message used when a rejection carries no readable error body.
pub const GENERIC_REJECTION: &str = "Falha ao enviar denúncia";

/// Errors from talking to the content API.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server rejected request ({status}): {message}")]
    ServerRejected {
        /// HTTP status code.
        status: u16,
        /// `error.message` from the body, or a generic message.
        message: String,
    },

    /// A body could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The attachment file could not be read.
    #[error("Failed to read attachment {uri}: {source}")]
    Attachment {
        /// Attachment URI as stored on the report.
        uri: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The attachment's MIME type does not parse.
    #[error("Invalid MIME type {mime_type:?} for attachment {uri}")]
    AttachmentType {
        /// Attachment URI as stored on the report.
        uri: String,
        /// MIME type as stored on the report.
        mime_type: String,
    },

    /// A configured header name or value is not valid HTTP.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// Header name as configured.
        name: String,
        /// Parse failure.
        message: String,
    },

    /// A fetched record could not be classified.
    #[error("Invalid record: {0}")]
    Classification(#[from] ClassificationError),
}

/// Client for the reports endpoint.
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
    reports_url: String,
}

impl ReportClient {
    /// Builds a client from API settings. Configured headers are sent on
    /// every request.
    ///
    /// # Errors
    ///
    /// * [`SubmissionError::InvalidHeader`] if a configured header is malformed
    /// * [`SubmissionError::Network`] if the HTTP client cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self, SubmissionError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                SubmissionError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| SubmissionError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            reports_url: config.reports_url(),
        })
    }

    /// Base URL media paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submits `report`.
    ///
    /// Returns the created record when the server echoes one back.
    ///
    /// # Errors
    ///
    /// * [`SubmissionError::Network`] if the request fails to complete
    /// * [`SubmissionError::ServerRejected`] on a non-2xx response
    /// * [`SubmissionError::Attachment`] if the audio file cannot be read
    /// * [`SubmissionError::AttachmentType`] if its MIME type is malformed
    pub async fn add_report(&self, report: &Report) -> Result<Option<CmsReport>, SubmissionError> {
        let body = CreateRequest::from_report(report);
        log::debug!("Sending request to {}", self.reports_url);

        let request = self.http.post(&self.reports_url);
        let request = match report.file() {
            Some(file) => {
                let data = serde_json::to_string(&body.data)?;
                request.multipart(attachment_form(data, file).await?)
            }
            None => request.json(&body),
        };

        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &text));
        }

        log::info!(
            "Report submitted ({} / {})",
            report.report_type(),
            report.urgency()
        );

        // Older CMS versions answer with an empty body.
        Ok(serde_json::from_str::<Created>(&text)
            .ok()
            .and_then(|created| created.data))
    }

    /// Fetches every report record, newest first, with relations populated.
    ///
    /// # Errors
    ///
    /// * [`SubmissionError::Network`] if the request fails to complete
    /// * [`SubmissionError::ServerRejected`] on a non-2xx response
    /// * [`SubmissionError::Serialization`] if the body is not a record list
    pub async fn fetch_records(&self) -> Result<Vec<CmsReport>, SubmissionError> {
        log::debug!("Sending request to {}", self.reports_url);

        let resp = self
            .http
            .get(&self.reports_url)
            .query(&[("populate", "*"), ("sort", "report_time:desc")])
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &text));
        }

        let list: ReportList = serde_json::from_str(&text)?;
        let records = list.into_vec();
        log::debug!("Fetched {} report records", records.len());
        Ok(records)
    }

    /// Fetches every report and classifies it into a [`Report`].
    ///
    /// # Errors
    ///
    /// As [`Self::fetch_records`], plus [`SubmissionError::Classification`]
    /// for the first record with an unknown type, urgency, or status.
    pub async fn fetch_reports(&self) -> Result<Vec<Report>, SubmissionError> {
        let now = Utc::now();
        self.fetch_records()
            .await?
            .into_iter()
            .map(|record| {
                record
                    .into_report(&self.base_url, now)
                    .map_err(SubmissionError::from)
            })
            .collect()
    }
}

fn rejection(status: u16, body: &str) -> SubmissionError {
    let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| GENERIC_REJECTION.to_string(),
        |err| err.error.message,
    );
    log::warn!("Server rejected request ({status}): {message}");
    SubmissionError::ServerRejected { status, message }
}

fn attachment_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

async fn attachment_form(
    data: String,
    file: &FileAttachment,
) -> Result<multipart::Form, SubmissionError> {
    let bytes = tokio::fs::read(attachment_path(&file.uri))
        .await
        .map_err(|source| SubmissionError::Attachment {
            uri: file.uri.clone(),
            source,
        })?;

    let part = multipart::Part::bytes(bytes)
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|_| SubmissionError::AttachmentType {
            uri: file.uri.clone(),
            mime_type: file.mime_type.clone(),
        })?;

    Ok(multipart::Form::new().text("data", data).part("files.files", part))
}
