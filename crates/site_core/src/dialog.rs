//! Operator dialogs. Answers arrive asynchronously so the rest of the site
//! keeps running while a prompt is open.

use async_trait::async_trait;

#[async_trait]
pub trait Dialog: Send + Sync {
    /// Asks for a secret; `None` means the operator cancelled.
    async fn prompt_secret(&self, message: &str) -> Option<String>;
    async fn confirm(&self, message: &str) -> bool;
}

/// Dialog with fixed answers, for unattended operation.
#[derive(Debug, Clone, Default)]
pub struct PresetDialog {
    pub secret: Option<String>,
    pub confirm: bool,
}

#[async_trait]
impl Dialog for PresetDialog {
    async fn prompt_secret(&self, _message: &str) -> Option<String> {
        self.secret.clone()
    }

    async fn confirm(&self, _message: &str) -> bool {
        self.confirm
    }
}
