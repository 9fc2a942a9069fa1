//! Operator actions: export of all registrations and clearing local data.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shared::{domain::RegistrationRecord, protocol::RecordSource};
use storage::RegistrationRepository;
use tracing::{info, warn};

use crate::{
    dialog::Dialog,
    error::{SiteError, SiteResult},
    export::{merge_remote, render_export, ExportFile},
    notifications::Notifier,
    remote::{RemoteError, RemoteRecordSource},
};

pub const DEFAULT_EXPORT_SECRET: &str = "awoc2025";
pub const SECRET_PROMPT: &str = "Enter password to download registration data:";
pub const CLEAR_PROMPT: &str =
    "Are you sure you want to clear all registration data? This action cannot be undone.";
pub const WRONG_SECRET_MESSAGE: &str = "Incorrect password.";
pub const NO_DATA_MESSAGE: &str = "No registration data found.";
pub const CLEARED_MESSAGE: &str = "All registration data has been cleared.";
pub const EXPORT_FAILED_MESSAGE: &str = "Registration data could not be exported. Please try again.";
pub const CLEAR_FAILED_MESSAGE: &str = "Registration data could not be cleared. Please try again.";

/// Plaintext shared-secret check. Anyone with the client build can read the
/// secret; this only keeps casual visitors away from the export button.
#[derive(Debug, Clone)]
pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn allows(&self, candidate: &str) -> bool {
        candidate == self.secret
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_SECRET)
    }
}

/// Receives finished export files, e.g. as browser downloads or files on disk.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn offer(&self, file: ExportFile) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Denied,
    NoData,
    Exported {
        spreadsheet: String,
        backup: String,
        record_count: usize,
        source: RecordSource,
    },
}

#[derive(Clone)]
pub struct AdminConsole {
    repository: RegistrationRepository,
    remote: Arc<dyn RemoteRecordSource>,
    notifier: Notifier,
    dialog: Arc<dyn Dialog>,
    downloads: Arc<dyn DownloadSink>,
    gate: AccessGate,
}

impl AdminConsole {
    pub fn new(
        repository: RegistrationRepository,
        remote: Arc<dyn RemoteRecordSource>,
        notifier: Notifier,
        dialog: Arc<dyn Dialog>,
        downloads: Arc<dyn DownloadSink>,
        gate: AccessGate,
    ) -> Self {
        Self {
            repository,
            remote,
            notifier,
            dialog,
            downloads,
            gate,
        }
    }

    pub async fn registration_count(&self) -> SiteResult<usize> {
        Ok(self.repository.count().await?)
    }

    /// Local registrations in insertion order.
    pub async fn records(&self) -> SiteResult<Vec<RegistrationRecord>> {
        Ok(self.repository.records().await?)
    }

    pub async fn export(&self) -> SiteResult<ExportOutcome> {
        let allowed = match self.dialog.prompt_secret(SECRET_PROMPT).await {
            Some(candidate) => self.gate.allows(&candidate),
            None => false,
        };
        if !allowed {
            info!("admin: export denied");
            self.notifier.error(WRONG_SECRET_MESSAGE).await;
            return Ok(ExportOutcome::Denied);
        }

        match self.deliver_export().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(error = %err, "admin: export failed");
                self.notifier.error(EXPORT_FAILED_MESSAGE).await;
                Err(err)
            }
        }
    }

    async fn deliver_export(&self) -> SiteResult<ExportOutcome> {
        let local = self.repository.records().await?;
        let (records, source) = match self.remote.fetch_remote_records().await {
            Ok(remote) => {
                let (merged, added) = merge_remote(local, remote);
                info!(added, "admin: merged remote registrations");
                (merged, RecordSource::LocalAndRemote)
            }
            Err(RemoteError::NotConfigured) => (local, RecordSource::Local),
            Err(err) => {
                warn!(error = %err, "admin: remote records unavailable, exporting local data only");
                (local, RecordSource::Local)
            }
        };

        if records.is_empty() {
            self.notifier.error(NO_DATA_MESSAGE).await;
            return Ok(ExportOutcome::NoData);
        }

        let [spreadsheet, backup] = render_export(&records, source, Utc::now())?;
        let spreadsheet_name = spreadsheet.filename.clone();
        let backup_name = backup.filename.clone();
        self.downloads
            .offer(spreadsheet)
            .await
            .map_err(SiteError::Download)?;
        self.downloads
            .offer(backup)
            .await
            .map_err(SiteError::Download)?;

        info!(
            records = records.len(),
            spreadsheet = %spreadsheet_name,
            "admin: export delivered"
        );
        self.notifier
            .success(format!("Spreadsheet downloaded: {spreadsheet_name}"))
            .await;
        Ok(ExportOutcome::Exported {
            spreadsheet: spreadsheet_name,
            backup: backup_name,
            record_count: records.len(),
            source,
        })
    }

    /// Wipes every local registration after confirmation. Returns whether
    /// anything was cleared. Remote data is never touched.
    pub async fn clear_all(&self) -> SiteResult<bool> {
        if !self.dialog.confirm(CLEAR_PROMPT).await {
            return Ok(false);
        }
        if let Err(err) = self.repository.clear().await {
            warn!(error = %err, "admin: clearing local registrations failed");
            self.notifier.error(CLEAR_FAILED_MESSAGE).await;
            return Err(err.into());
        }
        warn!(key = self.repository.key(), "admin: all local registrations cleared");
        self.notifier.success(CLEARED_MESSAGE).await;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
