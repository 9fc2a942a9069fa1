use super::*;
use shared::domain::{RecordId, RegistrationRecord};
use storage::MemoryStore;
use tokio::sync::Mutex;

use crate::{dialog::PresetDialog, remote::RemoteError};

fn record(id: i64) -> RegistrationRecord {
    RegistrationRecord {
        id: RecordId(id),
        timestamp: "2025-04-02T08:00:00.000Z".into(),
        name: format!("Attendee {id}"),
        email: format!("a{id}@example.org"),
        affiliation: "KAIST".into(),
        tutorials: "T1".into(),
        banquet: "Yes".into(),
        dietary: "None".into(),
        other_dietary: "N/A".into(),
    }
}

enum FakeRemote {
    Records(Vec<RegistrationRecord>),
    Down,
}

#[async_trait]
impl RemoteRecordSource for FakeRemote {
    async fn fetch_remote_records(&self) -> Result<Vec<RegistrationRecord>, RemoteError> {
        match self {
            FakeRemote::Records(records) => Ok(records.clone()),
            FakeRemote::Down => Err(RemoteError::Decode("offline".into())),
        }
    }

    async fn push_record(&self, _record: &RegistrationRecord) -> crate::remote::PushOutcome {
        crate::remote::PushOutcome::Unsupported
    }
}

#[derive(Default)]
struct CollectingSink {
    files: Mutex<Vec<ExportFile>>,
}

#[async_trait]
impl DownloadSink for CollectingSink {
    async fn offer(&self, file: ExportFile) -> anyhow::Result<()> {
        self.files.lock().await.push(file);
        Ok(())
    }
}

struct Harness {
    console: AdminConsole,
    repository: RegistrationRepository,
    notifier: Notifier,
    sink: Arc<CollectingSink>,
}

fn harness(remote: FakeRemote, dialog: PresetDialog) -> Harness {
    let repository = RegistrationRepository::new(Arc::new(MemoryStore::new()));
    let notifier = Notifier::new();
    let sink = Arc::new(CollectingSink::default());
    let console = AdminConsole::new(
        repository.clone(),
        Arc::new(remote),
        notifier.clone(),
        Arc::new(dialog),
        sink.clone(),
        AccessGate::default(),
    );
    Harness {
        console,
        repository,
        notifier,
        sink,
    }
}

fn operator(secret: &str) -> PresetDialog {
    PresetDialog {
        secret: Some(secret.into()),
        confirm: true,
    }
}

async fn toast(notifier: &Notifier) -> String {
    notifier.current().await.expect("toast").0.message
}

#[test]
fn gate_compares_plaintext() {
    let gate = AccessGate::default();
    assert!(gate.allows("awoc2025"));
    assert!(!gate.allows("AWOC2025"));
    assert!(!gate.allows(""));
}

#[tokio::test]
async fn wrong_or_cancelled_secret_denies_export() {
    let h = harness(FakeRemote::Down, operator("guess"));
    h.repository.append(record(1)).await.expect("seed");

    assert_eq!(h.console.export().await.expect("export"), ExportOutcome::Denied);
    assert_eq!(toast(&h.notifier).await, WRONG_SECRET_MESSAGE);
    assert!(h.sink.files.lock().await.is_empty());

    let h = harness(FakeRemote::Down, PresetDialog::default());
    assert_eq!(h.console.export().await.expect("export"), ExportOutcome::Denied);
}

#[tokio::test]
async fn export_with_no_records_produces_no_files() {
    let h = harness(FakeRemote::Records(Vec::new()), operator(DEFAULT_EXPORT_SECRET));

    assert_eq!(h.console.export().await.expect("export"), ExportOutcome::NoData);
    assert_eq!(toast(&h.notifier).await, NO_DATA_MESSAGE);
    assert!(h.sink.files.lock().await.is_empty());
}

#[tokio::test]
async fn export_merges_remote_records_by_id() {
    let h = harness(
        FakeRemote::Records(vec![record(1), record(5)]),
        operator(DEFAULT_EXPORT_SECRET),
    );
    h.repository.append(record(1)).await.expect("seed");
    h.repository.append(record(2)).await.expect("seed");

    let outcome = h.console.export().await.expect("export");

    let (spreadsheet, record_count, source) = match outcome {
        ExportOutcome::Exported {
            spreadsheet,
            record_count,
            source,
            ..
        } => (spreadsheet, record_count, source),
        other => panic!("expected export, got {other:?}"),
    };
    assert_eq!(record_count, 3);
    assert_eq!(source, RecordSource::LocalAndRemote);
    assert_eq!(
        toast(&h.notifier).await,
        format!("Spreadsheet downloaded: {spreadsheet}")
    );

    let files = h.sink.files.lock().await;
    assert_eq!(files.len(), 2);
    let backup: shared::protocol::BackupDocument =
        serde_json::from_slice(&files[1].bytes).expect("backup json");
    let ids: Vec<i64> = backup.registrations.iter().map(|r| r.id.0).collect();
    assert_eq!(ids, vec![1, 2, 5]);
    assert_eq!(backup.metadata.record_count, 3);

    // remote data is only merged into the export, never stored locally
    assert_eq!(h.repository.count().await.expect("count"), 2);
}

#[tokio::test]
async fn export_falls_back_to_local_when_remote_is_down() {
    let h = harness(FakeRemote::Down, operator(DEFAULT_EXPORT_SECRET));
    h.repository.append(record(1)).await.expect("seed");

    let outcome = h.console.export().await.expect("export");
    assert!(matches!(
        outcome,
        ExportOutcome::Exported {
            record_count: 1,
            source: RecordSource::Local,
            ..
        }
    ));
}

#[tokio::test]
async fn remote_only_records_are_still_exported() {
    let h = harness(
        FakeRemote::Records(vec![record(9)]),
        operator(DEFAULT_EXPORT_SECRET),
    );
    let outcome = h.console.export().await.expect("export");
    assert!(matches!(
        outcome,
        ExportOutcome::Exported {
            record_count: 1,
            ..
        }
    ));
}

#[tokio::test]
async fn clear_all_requires_confirmation() {
    let h = harness(
        FakeRemote::Down,
        PresetDialog {
            secret: None,
            confirm: false,
        },
    );
    h.repository.append(record(1)).await.expect("seed");

    assert!(!h.console.clear_all().await.expect("clear"));
    assert_eq!(h.console.registration_count().await.expect("count"), 1);
}

#[tokio::test]
async fn confirmed_clear_empties_the_store() {
    let h = harness(FakeRemote::Down, operator(DEFAULT_EXPORT_SECRET));
    h.repository.append(record(1)).await.expect("seed");
    h.repository.append(record(2)).await.expect("seed");
    let ids: Vec<i64> = h
        .console
        .records()
        .await
        .expect("records")
        .iter()
        .map(|r| r.id.0)
        .collect();
    assert_eq!(ids, vec![1, 2]);

    assert!(h.console.clear_all().await.expect("clear"));
    assert!(h.repository.records().await.expect("records").is_empty());
    assert_eq!(toast(&h.notifier).await, CLEARED_MESSAGE);
}

struct FailingSink;

#[async_trait]
impl DownloadSink for FailingSink {
    async fn offer(&self, _file: ExportFile) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

struct UnreachableStore;

#[async_trait]
impl storage::KeyValueStore for UnreachableStore {
    async fn get_item(&self, _key: &str) -> storage::StoreResult<storage::ItemSnapshot> {
        Err(anyhow::anyhow!("database is locked").into())
    }

    async fn set_item(
        &self,
        _key: &str,
        _value: &str,
        _expected: storage::Revision,
    ) -> storage::StoreResult<storage::Revision> {
        Err(anyhow::anyhow!("database is locked").into())
    }

    async fn remove_item(&self, _key: &str) -> storage::StoreResult<()> {
        Err(anyhow::anyhow!("database is locked").into())
    }
}

async fn error_toast(notifier: &Notifier) -> String {
    let (notification, _) = notifier.current().await.expect("toast");
    assert_eq!(notification.severity, shared::domain::Severity::Error);
    notification.message
}

#[tokio::test]
async fn failed_delivery_reports_an_error_toast() {
    let repository = RegistrationRepository::new(Arc::new(MemoryStore::new()));
    repository.append(record(1)).await.expect("seed");
    let notifier = Notifier::new();
    let console = AdminConsole::new(
        repository,
        Arc::new(FakeRemote::Down),
        notifier.clone(),
        Arc::new(operator(DEFAULT_EXPORT_SECRET)),
        Arc::new(FailingSink),
        AccessGate::default(),
    );

    let err = console.export().await.expect_err("delivery fails");
    assert!(matches!(err, SiteError::Download(_)));
    assert_eq!(error_toast(&notifier).await, EXPORT_FAILED_MESSAGE);
}

#[tokio::test]
async fn store_failures_report_error_toasts() {
    let notifier = Notifier::new();
    let console = AdminConsole::new(
        RegistrationRepository::new(Arc::new(UnreachableStore)),
        Arc::new(FakeRemote::Down),
        notifier.clone(),
        Arc::new(operator(DEFAULT_EXPORT_SECRET)),
        Arc::new(CollectingSink::default()),
        AccessGate::default(),
    );

    let err = console.export().await.expect_err("read fails");
    assert!(matches!(err, SiteError::Store(_)));
    assert_eq!(error_toast(&notifier).await, EXPORT_FAILED_MESSAGE);

    let err = console.clear_all().await.expect_err("clear fails");
    assert!(matches!(err, SiteError::Store(_)));
    assert_eq!(error_toast(&notifier).await, CLEAR_FAILED_MESSAGE);
}
