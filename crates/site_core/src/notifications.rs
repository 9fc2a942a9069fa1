//! Transient toast notifications. At most one is visible; a newer one
//! replaces the current one immediately.

use std::{sync::Arc, time::Duration};

use shared::domain::Severity;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::debug;

pub const AUTO_DISMISS_AFTER: Duration = Duration::from_secs(5);
pub const DISMISS_ANIMATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn background_color(&self) -> &'static str {
        self.severity.background_color()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Visible,
    Dismissing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissing(NotificationId),
    Removed(NotificationId),
}

struct NotifierState {
    next_id: u64,
    current: Option<(Notification, NotificationPhase)>,
    auto_dismiss: Option<JoinHandle<()>>,
}

struct NotifierInner {
    state: Mutex<NotifierState>,
    events: broadcast::Sender<NotificationEvent>,
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(NotifierInner {
                state: Mutex::new(NotifierState {
                    next_id: 1,
                    current: None,
                    auto_dismiss: None,
                }),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    pub async fn current(&self) -> Option<(Notification, NotificationPhase)> {
        self.inner.state.lock().await.current.clone()
    }

    pub async fn info(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Info).await
    }

    pub async fn success(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Error).await
    }

    /// Shows `message`, replacing whatever is on screen, and schedules its
    /// automatic dismissal.
    pub async fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let mut guard = self.inner.state.lock().await;

        if let Some(timer) = guard.auto_dismiss.take() {
            timer.abort();
        }
        if let Some((previous, _)) = guard.current.take() {
            let _ = self.inner.events.send(NotificationEvent::Removed(previous.id));
        }

        let id = NotificationId(guard.next_id);
        guard.next_id += 1;
        let notification = Notification {
            id,
            message: message.into(),
            severity,
        };
        debug!(id = id.0, ?severity, message = %notification.message, "notify: shown");
        guard.current = Some((notification.clone(), NotificationPhase::Visible));
        let _ = self.inner.events.send(NotificationEvent::Shown(notification));

        let notifier = self.clone();
        guard.auto_dismiss = Some(tokio::spawn(async move {
            tokio::time::sleep(AUTO_DISMISS_AFTER).await;
            notifier.dismiss(id).await;
        }));
        id
    }

    /// Starts the dismiss animation for `id`. Returns `false` when `id` is no
    /// longer the visible notification or is already leaving.
    pub async fn dismiss(&self, id: NotificationId) -> bool {
        {
            let mut guard = self.inner.state.lock().await;
            match guard.current.as_mut() {
                Some((current, phase))
                    if current.id == id && *phase == NotificationPhase::Visible =>
                {
                    *phase = NotificationPhase::Dismissing;
                }
                _ => return false,
            }
        }
        let _ = self.inner.events.send(NotificationEvent::Dismissing(id));

        let notifier = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DISMISS_ANIMATION).await;
            notifier.remove(id).await;
        });
        true
    }

    async fn remove(&self, id: NotificationId) {
        let mut guard = self.inner.state.lock().await;
        if guard.current.as_ref().map(|(n, _)| n.id) == Some(id) {
            guard.current = None;
            let _ = self.inner.events.send(NotificationEvent::Removed(id));
        }
    }
}

#[cfg(test)]
#[path = "tests/notifications_tests.rs"]
mod tests;
