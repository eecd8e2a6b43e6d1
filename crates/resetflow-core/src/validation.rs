//! Local pre-submission checks shared by both reset flows.
//!
//! Everything here is pure: no network, no flow state. The server stays the
//! final arbiter of credential strength; these rules only stop obviously bad
//! input before a request is sent.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Client-side minimum length for a replacement password.
pub const MIN_CREDENTIAL_LEN: usize = 8;

const IDENTIFIER_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Input fields a flow can attach a validation error to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Identifier,
    NewCredential,
}

impl Field {
    /// Name used on the wire and by presentation layers.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::NewCredential => "newCredential",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value is required")]
    Required,

    #[error("value is not in the expected format")]
    InvalidFormat,

    #[error("value must be at least {min} characters")]
    TooShort { min: usize },
}

fn identifier_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"))
}

/// Check an account identifier (`local@domain.tld`).
pub fn validate_identifier(value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() {
        return Some(ValidationError::Required);
    }
    if !identifier_regex().is_match(value) {
        return Some(ValidationError::InvalidFormat);
    }
    None
}

/// Check a replacement password against the client-side minimum.
pub fn validate_credential(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::Required);
    }
    if value.chars().count() < MIN_CREDENTIAL_LEN {
        return Some(ValidationError::TooShort {
            min: MIN_CREDENTIAL_LEN,
        });
    }
    None
}

/// Per-field validation errors owned by a single flow instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, ValidationError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` for `field` when present; a `None` leaves the field clean.
    pub fn record(&mut self, field: Field, error: Option<ValidationError>) {
        match error {
            Some(err) => {
                self.0.insert(field, err);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<ValidationError> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, ValidationError)> + '_ {
        self.0.iter().map(|(field, err)| (*field, *err))
    }

    /// Human-readable message for `field`, worded for a reset form.
    pub fn message(&self, field: Field) -> Option<String> {
        self.get(field).map(|err| describe(field, err))
    }
}

fn describe(field: Field, err: ValidationError) -> String {
    match (field, err) {
        (Field::Identifier, ValidationError::Required) => "Email is required".to_string(),
        (Field::Identifier, _) => "Invalid email address".to_string(),
        (Field::NewCredential, ValidationError::Required) => "Password is required".to_string(),
        (Field::NewCredential, ValidationError::TooShort { min }) => {
            format!("Password must be at least {min} characters")
        }
        (Field::NewCredential, ValidationError::InvalidFormat) => "Invalid password".to_string(),
    }
}
