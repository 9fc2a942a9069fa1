//! Remote record source used to aggregate registrations across devices.
//!
//! Only the read side exists. `push_record` is part of the interface so a
//! real backend can be plugged in later, but the HTTP source reports
//! [`PushOutcome::Unsupported`] instead of pretending to have saved anything.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use shared::{domain::RegistrationRecord, protocol::RemoteRecordsDocument};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no remote record source configured")]
    NotConfigured,
    #[error("network error talking to remote record source: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid remote payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    Unsupported,
    Failed(String),
}

#[async_trait]
pub trait RemoteRecordSource: Send + Sync {
    async fn fetch_remote_records(&self) -> Result<Vec<RegistrationRecord>, RemoteError>;
    async fn push_record(&self, record: &RegistrationRecord) -> PushOutcome;
}

pub struct NoRemoteSource;

#[async_trait]
impl RemoteRecordSource for NoRemoteSource {
    async fn fetch_remote_records(&self) -> Result<Vec<RegistrationRecord>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn push_record(&self, _record: &RegistrationRecord) -> PushOutcome {
        PushOutcome::Unsupported
    }
}

pub struct HttpRemoteSource {
    http: Client,
    url: Url,
}

impl HttpRemoteSource {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RemoteRecordSource for HttpRemoteSource {
    async fn fetch_remote_records(&self) -> Result<Vec<RegistrationRecord>, RemoteError> {
        let response = self.http.get(self.url.clone()).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            info!(url = %self.url, "remote: record document not found, treating as empty");
            return Ok(Vec::new());
        }

        let document: RemoteRecordsDocument = response.error_for_status()?.json().await?;
        let records = decode_records_document(&document)?;
        debug!(url = %self.url, count = records.len(), "remote: records fetched");
        Ok(records)
    }

    async fn push_record(&self, record: &RegistrationRecord) -> PushOutcome {
        debug!(
            url = %self.url,
            record_id = record.id.0,
            "remote: write path not available, record kept local"
        );
        PushOutcome::Unsupported
    }
}

/// Decodes the base64 `content` of a remote document into records.
pub fn decode_records_document(
    document: &RemoteRecordsDocument,
) -> Result<Vec<RegistrationRecord>, RemoteError> {
    if let Some(encoding) = document.encoding.as_deref() {
        if !encoding.eq_ignore_ascii_case("base64") {
            return Err(RemoteError::Decode(format!(
                "unsupported content encoding `{encoding}`"
            )));
        }
    }

    let compact: String = document
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| RemoteError::Decode(format!("content is not base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RemoteError::Decode(format!("content is not a record list: {e}")))
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
