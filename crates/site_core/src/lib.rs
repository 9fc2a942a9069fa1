//! Client-side behavior of the AWOC-JKWOC conference site.
//!
//! Everything is wired by one explicit [`Site::init`] call. Browser
//! collaborators (local storage, the remote record source, operator dialogs
//! and file downloads) are injected as trait objects.

use std::sync::Arc;

use storage::{KeyValueStore, RegistrationRepository};
use tracing::info;

pub mod admin;
pub mod animation;
pub mod dialog;
pub mod error;
pub mod export;
pub mod navigation;
pub mod notifications;
pub mod registration;
pub mod remote;
pub mod tabs;

pub use admin::{AccessGate, AdminConsole, DownloadSink, ExportOutcome};
pub use dialog::{Dialog, PresetDialog};
pub use error::{SiteError, SiteResult};
pub use notifications::{Notification, NotificationEvent, Notifier};
pub use registration::{RegistrationForm, RegistrationPipeline, SavedRegistration};
pub use remote::{HttpRemoteSource, NoRemoteSource, PushOutcome, RemoteRecordSource};

use animation::{RevealController, StatsCounterTrigger};
use navigation::{MobileMenu, NavigationController, SectionBox};
use tabs::{TabButton, TabController, TabPanel};

/// Static page structure read once at start-up.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub nav_links: Vec<String>,
    pub sections: Vec<SectionBox>,
    pub has_mobile_menu: bool,
    pub tab_buttons: Vec<TabButton>,
    pub tab_panels: Vec<TabPanel>,
    pub tutorial_options: Vec<String>,
    pub reveal_targets: Vec<String>,
}

pub struct SiteServices {
    pub store: Arc<dyn KeyValueStore>,
    pub remote: Arc<dyn RemoteRecordSource>,
    pub dialog: Arc<dyn Dialog>,
    pub downloads: Arc<dyn DownloadSink>,
    pub gate: AccessGate,
}

/// Handles to every behavior on the page. Dropping the site drops them.
pub struct Site {
    pub navigation: NavigationController,
    pub tabs: TabController,
    pub registration_form: RegistrationForm,
    pub registrations: RegistrationPipeline,
    pub admin: AdminConsole,
    pub notifier: Notifier,
    pub reveal: RevealController,
    pub stats: StatsCounterTrigger,
}

impl Site {
    pub fn init(layout: PageLayout, services: SiteServices) -> Self {
        let notifier = Notifier::new();
        let repository = RegistrationRepository::new(services.store);

        let registrations = RegistrationPipeline::new(
            repository.clone(),
            services.remote.clone(),
            notifier.clone(),
        );
        let admin = AdminConsole::new(
            repository,
            services.remote,
            notifier.clone(),
            services.dialog,
            services.downloads,
            services.gate,
        );

        info!(
            links = layout.nav_links.len(),
            sections = layout.sections.len(),
            tabs = layout.tab_buttons.len(),
            reveal_targets = layout.reveal_targets.len(),
            "site: initialized"
        );

        Self {
            navigation: NavigationController::new(
                layout.nav_links,
                layout.sections,
                MobileMenu::new(layout.has_mobile_menu),
            ),
            tabs: TabController::new(layout.tab_buttons, layout.tab_panels),
            registration_form: RegistrationForm::new(layout.tutorial_options),
            registrations,
            admin,
            notifier,
            reveal: RevealController::new(layout.reveal_targets),
            stats: StatsCounterTrigger::new(),
        }
    }

    /// Submits the live registration form.
    pub async fn submit_registration(&mut self) -> SiteResult<SavedRegistration> {
        self.registrations.submit(&mut self.registration_form).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
