use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::RegistrationRecord;

/// Body returned by the remote record endpoint.
///
/// `content` is the base64 encoding of a JSON array of records. Line breaks
/// inside the base64 payload are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecordsDocument {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Local,
    LocalAndRemote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub created_at: DateTime<Utc>,
    pub record_count: usize,
    pub source: RecordSource,
}

/// JSON backup written next to the spreadsheet export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    pub metadata: BackupMetadata,
    pub registrations: Vec<RegistrationRecord>,
}

impl BackupDocument {
    pub fn new(
        created_at: DateTime<Utc>,
        source: RecordSource,
        registrations: Vec<RegistrationRecord>,
    ) -> Self {
        Self {
            metadata: BackupMetadata {
                created_at,
                record_count: registrations.len(),
                source,
            },
            registrations,
        }
    }
}
