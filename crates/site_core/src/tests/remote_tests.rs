use super::*;
use axum::{http::StatusCode, routing::get, Json, Router};
use shared::domain::RecordId;
use tokio::net::TcpListener;

fn record(id: i64) -> RegistrationRecord {
    RegistrationRecord {
        id: RecordId(id),
        timestamp: "2025-02-10T01:02:03.004Z".into(),
        name: format!("Remote {id}"),
        email: format!("remote{id}@example.org"),
        affiliation: "POSTECH".into(),
        tutorials: "T2".into(),
        banquet: "Yes".into(),
        dietary: "Halal".into(),
        other_dietary: "N/A".into(),
    }
}

fn encoded_document(records: &[RegistrationRecord]) -> RemoteRecordsDocument {
    let json = serde_json::to_vec(records).expect("encode");
    let b64 = STANDARD.encode(json);
    // wrap like the contents API does
    let wrapped = b64
        .as_bytes()
        .chunks(60)
        .map(|chunk| std::str::from_utf8(chunk).expect("ascii"))
        .collect::<Vec<_>>()
        .join("\n");
    RemoteRecordsDocument {
        content: wrapped,
        encoding: Some("base64".into()),
        sha: None,
    }
}

async fn spawn_server(app: Router) -> anyhow::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Url::parse(&format!("http://{addr}/registrations.json"))?)
}

#[test]
fn decodes_wrapped_base64_document() {
    let document = encoded_document(&[record(1), record(2)]);
    let records = decode_records_document(&document).expect("decode");
    assert_eq!(records, vec![record(1), record(2)]);
}

#[test]
fn rejects_foreign_encoding() {
    let mut document = encoded_document(&[record(1)]);
    document.encoding = Some("utf-8".into());
    assert!(matches!(
        decode_records_document(&document),
        Err(RemoteError::Decode(_))
    ));
}

#[test]
fn rejects_garbage_content() {
    let document = RemoteRecordsDocument {
        content: "!!!not base64!!!".into(),
        encoding: None,
        sha: None,
    };
    assert!(matches!(
        decode_records_document(&document),
        Err(RemoteError::Decode(_))
    ));
}

#[tokio::test]
async fn http_source_fetches_records() {
    let document = encoded_document(&[record(7)]);
    let app = Router::new().route(
        "/registrations.json",
        get(move || {
            let document = document.clone();
            async move { Json(document) }
        }),
    );
    let url = spawn_server(app).await.expect("server");

    let source = HttpRemoteSource::new(url);
    let records = source.fetch_remote_records().await.expect("fetch");
    assert_eq!(records, vec![record(7)]);
}

#[tokio::test]
async fn http_source_treats_missing_document_as_empty() {
    let app = Router::new().route("/registrations.json", get(|| async { StatusCode::NOT_FOUND }));
    let url = spawn_server(app).await.expect("server");

    let records = HttpRemoteSource::new(url)
        .fetch_remote_records()
        .await
        .expect("fetch");
    assert!(records.is_empty());
}

#[tokio::test]
async fn http_source_surfaces_server_errors() {
    let app = Router::new().route(
        "/registrations.json",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let url = spawn_server(app).await.expect("server");

    let err = HttpRemoteSource::new(url)
        .fetch_remote_records()
        .await
        .expect_err("500 must fail");
    assert!(matches!(err, RemoteError::Network(_)));
}

#[tokio::test]
async fn push_is_reported_as_unsupported() {
    let source = HttpRemoteSource::new(Url::parse("http://127.0.0.1:9/x").expect("url"));
    assert_eq!(source.push_record(&record(1)).await, PushOutcome::Unsupported);
    assert_eq!(NoRemoteSource.push_record(&record(1)).await, PushOutcome::Unsupported);
    assert!(matches!(
        NoRemoteSource.fetch_remote_records().await,
        Err(RemoteError::NotConfigured)
    ));
}
