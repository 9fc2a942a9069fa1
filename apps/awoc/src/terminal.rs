//! Terminal and filesystem stand-ins for browser dialogs and downloads.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use shared::domain::Severity;
use site_core::{export::ExportFile, Dialog, DownloadSink, NotificationEvent};
use tokio::{
    io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{info, warn};

/// Reads answers from stdin. End of input counts as cancel.
pub struct TerminalDialog;

#[async_trait]
impl Dialog for TerminalDialog {
    async fn prompt_secret(&self, message: &str) -> Option<String> {
        read_answer(message).await
    }

    async fn confirm(&self, message: &str) -> bool {
        let answer = read_answer(&format!("{message} [y/N]")).await;
        is_affirmative(answer.as_deref())
    }
}

pub(crate) fn is_affirmative(answer: Option<&str>) -> bool {
    matches!(
        answer.map(|a| a.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes")
    )
}

/// Writes `prompt` and flushes it. Failures are logged; the caller still
/// reads an answer. Returns whether the prompt reached the writer.
pub(crate) async fn write_prompt<W>(out: &mut W, prompt: &str) -> bool
where
    W: AsyncWrite + Unpin,
{
    if let Err(err) = out.write_all(format!("{prompt} ").as_bytes()).await {
        warn!(error = %err, "terminal: prompt write failed");
        return false;
    }
    if let Err(err) = out.flush().await {
        warn!(error = %err, "terminal: prompt flush failed");
        return false;
    }
    true
}

async fn read_answer(prompt: &str) -> Option<String> {
    write_prompt(&mut tokio::io::stderr(), prompt).await;

    let mut line = String::new();
    match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(err) => {
            warn!(error = %err, "terminal: stdin read failed");
            None
        }
    }
}

/// Writes offered export files into a directory, creating it when missing.
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloadSink {
    async fn offer(&self, file: ExportFile) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create export dir '{}'", self.dir.display()))?;
        let path = self.dir.join(&file.filename);
        tokio::fs::write(&path, &file.bytes)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        info!(
            path = %path.display(),
            bytes = file.bytes.len(),
            mime = file.mime_type,
            "terminal: export file written"
        );
        Ok(())
    }
}

pub(crate) fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Error => "error",
    }
}

/// Prints every notification shown since the receiver was created.
pub fn print_notifications(events: &mut broadcast::Receiver<NotificationEvent>) {
    loop {
        match events.try_recv() {
            Ok(NotificationEvent::Shown(notification)) => {
                println!(
                    "[{}] {}",
                    severity_label(notification.severity),
                    notification.message
                );
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "terminal: notifications dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
