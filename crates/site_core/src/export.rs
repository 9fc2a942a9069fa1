//! Spreadsheet and JSON backup rendering for the registration list.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use csv::Writer;
use shared::{
    domain::RegistrationRecord,
    protocol::{BackupDocument, RecordSource},
};
use thiserror::Error;

pub const EXPORT_PREFIX: &str = "AWOC-JKWOC_2025_Registrations";
pub const SPREADSHEET_MIME: &str = "text/csv";
pub const BACKUP_MIME: &str = "application/json";

pub const SPREADSHEET_COLUMNS: [&str; 9] = [
    "ID",
    "Timestamp",
    "Full Name",
    "Email",
    "Affiliation",
    "Tutorials",
    "Banquet",
    "Dietary Preference",
    "Other Dietary",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("backup encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn spreadsheet_filename(date: NaiveDate) -> String {
    format!("{EXPORT_PREFIX}_{}.csv", date.format("%Y-%m-%d"))
}

pub fn backup_filename(date: NaiveDate) -> String {
    format!("{EXPORT_PREFIX}_{}.json", date.format("%Y-%m-%d"))
}

/// Appends remote records whose id is not already present locally. Returns
/// the merged list and the number of records added.
pub fn merge_remote(
    mut local: Vec<RegistrationRecord>,
    remote: Vec<RegistrationRecord>,
) -> (Vec<RegistrationRecord>, usize) {
    let mut known: HashSet<_> = local.iter().map(|record| record.id).collect();
    let before = local.len();
    for record in remote {
        if known.insert(record.id) {
            local.push(record);
        }
    }
    let added = local.len() - before;
    (local, added)
}

pub fn render_spreadsheet(records: &[RegistrationRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(SPREADSHEET_COLUMNS)?;
    for record in records {
        let id = record.id.0.to_string();
        writer.write_record([
            id.as_str(),
            record.timestamp.as_str(),
            record.name.as_str(),
            record.email.as_str(),
            record.affiliation.as_str(),
            record.tutorials.as_str(),
            record.banquet.as_str(),
            record.dietary.as_str(),
            record.other_dietary.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

pub fn render_backup(
    records: &[RegistrationRecord],
    source: RecordSource,
    created_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let document = BackupDocument::new(created_at, source, records.to_vec());
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Renders both export files for `records`, named after `now`'s date.
pub fn render_export(
    records: &[RegistrationRecord],
    source: RecordSource,
    now: DateTime<Utc>,
) -> Result<[ExportFile; 2], ExportError> {
    let date = now.date_naive();
    Ok([
        ExportFile {
            filename: spreadsheet_filename(date),
            mime_type: SPREADSHEET_MIME,
            bytes: render_spreadsheet(records)?,
        },
        ExportFile {
            filename: backup_filename(date),
            mime_type: BACKUP_MIME,
            bytes: render_backup(records, source, now)?,
        },
    ])
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
