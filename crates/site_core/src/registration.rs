//! Registration form wiring, validation and the save pipeline.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{
    domain::{
        FormSubmission, RecordId, RegistrationRecord, RequiredField, DIETARY_OTHER,
        NO_TUTORIALS, OTHER_DIETARY_FALLBACK,
    },
    error::ValidationError,
};
use storage::{RegistrationRepository, StoreResult};
use tracing::{info, warn};

use crate::{
    error::{SiteError, SiteResult},
    notifications::Notifier,
    remote::{PushOutcome, RemoteRecordSource},
};

pub const SAVED_AND_SYNCED_MESSAGE: &str =
    "Registration submitted successfully! Thank you for registering.";
pub const SAVED_LOCALLY_MESSAGE: &str = "Registration saved locally. Thank you for registering.";
pub const SAVE_FAILED_MESSAGE: &str = "Registration could not be saved. Please try again.";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialOption {
    pub value: String,
    pub checked: bool,
}

impl TutorialOption {
    fn is_sentinel(&self) -> bool {
        self.value == NO_TUTORIALS
    }
}

/// Live state of the registration form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub affiliation: String,
    pub banquet: String,
    dietary: String,
    pub other_dietary_text: String,
    other_dietary_visible: bool,
    tutorials: Vec<TutorialOption>,
}

impl RegistrationForm {
    pub fn new(tutorial_values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tutorials: tutorial_values
                .into_iter()
                .map(|value| TutorialOption {
                    value: value.into(),
                    checked: false,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn dietary(&self) -> &str {
        &self.dietary
    }

    /// Changing the dietary select shows the companion text field only for
    /// the "Other" option.
    pub fn set_dietary(&mut self, value: impl Into<String>) {
        self.dietary = value.into();
        self.other_dietary_visible = self.dietary == DIETARY_OTHER;
    }

    pub fn other_dietary_visible(&self) -> bool {
        self.other_dietary_visible
    }

    pub fn tutorials(&self) -> &[TutorialOption] {
        &self.tutorials
    }

    /// Checks or unchecks a tutorial box, keeping "no tutorials" exclusive.
    /// Unknown values are ignored.
    pub fn set_tutorial(&mut self, value: &str, checked: bool) {
        let Some(index) = self.tutorials.iter().position(|t| t.value == value) else {
            return;
        };
        self.tutorials[index].checked = checked;
        if !checked {
            return;
        }

        let sentinel_changed = self.tutorials[index].is_sentinel();
        for (i, option) in self.tutorials.iter_mut().enumerate() {
            if i != index && option.is_sentinel() != sentinel_changed {
                option.checked = false;
            }
        }
    }

    pub fn submission(&self) -> FormSubmission {
        FormSubmission {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            affiliation: Some(self.affiliation.clone()),
            banquet: Some(self.banquet.clone()),
            dietary: Some(self.dietary.clone()),
            other_dietary_text: Some(self.other_dietary_text.clone()),
            tutorials: self
                .tutorials
                .iter()
                .filter(|t| t.checked)
                .map(|t| t.value.clone())
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        let tutorials = std::mem::take(&mut self.tutorials);
        *self = Self {
            tutorials: tutorials
                .into_iter()
                .map(|t| TutorialOption {
                    checked: false,
                    ..t
                })
                .collect(),
            ..Self::default()
        };
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn validate(submission: &FormSubmission) -> Result<(), ValidationError> {
    for field in RequiredField::ALL {
        if is_blank(submission.field(field)) {
            return Err(ValidationError::MissingField(field));
        }
    }

    if !EMAIL_PATTERN.is_match(submission.email.as_deref().unwrap_or_default()) {
        return Err(ValidationError::InvalidEmail);
    }

    if submission.tutorials.is_empty() {
        return Err(ValidationError::NoTutorialSelected);
    }

    if submission.chose_other_dietary() && is_blank(submission.other_dietary_text.as_deref()) {
        return Err(ValidationError::MissingOtherDietary);
    }

    Ok(())
}

/// Issues record ids from the wall clock, never repeating or going backwards
/// within one process.
#[derive(Debug, Default)]
pub struct RecordClock {
    last: AtomicI64,
}

impl RecordClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures later ids are greater than `id`, e.g. one already persisted
    /// by an earlier process.
    pub fn observe(&self, id: RecordId) {
        self.last.fetch_max(id.0, Ordering::Relaxed);
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> RecordId {
        let candidate = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(last + 1);
            match self
                .last
                .compare_exchange(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return RecordId(next),
                Err(actual) => last = actual,
            }
        }
    }
}

/// Builds the persisted record from an already validated submission.
pub fn build_record(
    submission: &FormSubmission,
    id: RecordId,
    now: DateTime<Utc>,
) -> RegistrationRecord {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    RegistrationRecord {
        id,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        name: text(&submission.name),
        email: text(&submission.email),
        affiliation: text(&submission.affiliation),
        tutorials: submission.tutorials.join(", "),
        banquet: text(&submission.banquet),
        dietary: text(&submission.dietary),
        other_dietary: submission
            .other_dietary_text
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| OTHER_DIETARY_FALLBACK.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRegistration {
    pub record: RegistrationRecord,
    pub sync: PushOutcome,
    pub total_records: usize,
}

#[derive(Clone)]
pub struct RegistrationPipeline {
    repository: RegistrationRepository,
    remote: Arc<dyn RemoteRecordSource>,
    notifier: Notifier,
    clock: Arc<RecordClock>,
}

impl RegistrationPipeline {
    pub fn new(
        repository: RegistrationRepository,
        remote: Arc<dyn RemoteRecordSource>,
        notifier: Notifier,
    ) -> Self {
        Self {
            repository,
            remote,
            notifier,
            clock: Arc::new(RecordClock::new()),
        }
    }

    /// Validates and saves the form. The form is reset only on success.
    pub async fn submit(&self, form: &mut RegistrationForm) -> SiteResult<SavedRegistration> {
        let saved = self.register(&form.submission()).await?;
        form.reset();
        Ok(saved)
    }

    /// Validates, persists locally, then attempts the remote push. The
    /// outcome is always reported through the notifier.
    pub async fn register(&self, submission: &FormSubmission) -> SiteResult<SavedRegistration> {
        if let Err(err) = validate(submission) {
            info!(reason = %err, "registration: rejected");
            self.notifier.error(err.user_message()).await;
            return Err(SiteError::Validation(err));
        }

        let (record, records) = match self.persist(submission).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(error = %err, "registration: local save failed");
                self.notifier.error(SAVE_FAILED_MESSAGE).await;
                return Err(SiteError::Store(err));
            }
        };
        info!(
            record_id = record.id.0,
            total = records.len(),
            "registration: saved locally"
        );

        let sync = self.remote.push_record(&record).await;
        match &sync {
            PushOutcome::Pushed => {
                self.notifier.success(SAVED_AND_SYNCED_MESSAGE).await;
            }
            PushOutcome::Unsupported => {
                self.notifier.success(SAVED_LOCALLY_MESSAGE).await;
            }
            PushOutcome::Failed(reason) => {
                warn!(record_id = record.id.0, %reason, "registration: remote sync failed");
                self.notifier.success(SAVED_LOCALLY_MESSAGE).await;
            }
        }

        Ok(SavedRegistration {
            record,
            sync,
            total_records: records.len(),
        })
    }

    pub async fn registration_count(&self) -> SiteResult<usize> {
        Ok(self.repository.count().await?)
    }

    async fn persist(
        &self,
        submission: &FormSubmission,
    ) -> StoreResult<(RegistrationRecord, Vec<RegistrationRecord>)> {
        if let Some(latest) = self.repository.latest_id().await? {
            self.clock.observe(latest);
        }
        let now = Utc::now();
        let record = build_record(submission, self.clock.next_id(now), now);
        let records = self.repository.append(record.clone()).await?;
        Ok((record, records))
    }
}

#[cfg(test)]
#[path = "tests/registration_tests.rs"]
mod tests;
