use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(RecordId);

/// Local store key holding the serialized registration list.
pub const REGISTRATIONS_KEY: &str = "awoc_registrations";

/// Dietary option that requires the companion free-text field.
pub const DIETARY_OTHER: &str = "Other";

/// Tutorial option meaning "no tutorials"; exclusive with every other option.
pub const NO_TUTORIALS: &str = "No Tutorials";

/// Stored in `other_dietary` when no companion text was submitted.
pub const OTHER_DIETARY_FALLBACK: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn background_color(self) -> &'static str {
        match self {
            Severity::Info => "#2196F3",
            Severity::Success => "#4CAF50",
            Severity::Error => "#f44336",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: RecordId,
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub affiliation: String,
    pub tutorials: String,
    pub banquet: String,
    pub dietary: String,
    pub other_dietary: String,
}

/// Raw field values captured from the registration form at submit time.
///
/// Missing inputs are `None`; present-but-blank inputs are `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub affiliation: Option<String>,
    pub banquet: Option<String>,
    pub dietary: Option<String>,
    pub other_dietary_text: Option<String>,
    pub tutorials: Vec<String>,
}

impl FormSubmission {
    pub fn field(&self, field: RequiredField) -> Option<&str> {
        match field {
            RequiredField::Name => self.name.as_deref(),
            RequiredField::Email => self.email.as_deref(),
            RequiredField::Affiliation => self.affiliation.as_deref(),
            RequiredField::Banquet => self.banquet.as_deref(),
            RequiredField::Dietary => self.dietary.as_deref(),
        }
    }

    pub fn chose_other_dietary(&self) -> bool {
        self.dietary.as_deref() == Some(DIETARY_OTHER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Email,
    Affiliation,
    Banquet,
    Dietary,
}

impl RequiredField {
    pub const ALL: [RequiredField; 5] = [
        RequiredField::Name,
        RequiredField::Email,
        RequiredField::Affiliation,
        RequiredField::Banquet,
        RequiredField::Dietary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Email => "email",
            RequiredField::Affiliation => "affiliation",
            RequiredField::Banquet => "banquet",
            RequiredField::Dietary => "dietary",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
