use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RequiredField;

/// The only message users see for a rejected registration.
pub const GENERIC_VALIDATION_MESSAGE: &str = "Please fill in all required fields.";

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "rule", content = "field", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("required field `{0}` is missing or blank")]
    MissingField(RequiredField),
    #[error("email address does not look like local@domain.tld")]
    InvalidEmail,
    #[error("no tutorial option selected")]
    NoTutorialSelected,
    #[error("dietary preference is Other but no description was given")]
    MissingOtherDietary,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        GENERIC_VALIDATION_MESSAGE
    }
}
