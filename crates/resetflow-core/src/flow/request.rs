use super::{ResetFlow, ResetForm};
use crate::config::Messages;
use crate::logging::mask;
use crate::transport::{Endpoint, ResetPayload, ResetRequestBody, ResetTransport};
use crate::validation::{validate_identifier, Field, FieldErrors};

/// Input for asking the server to issue a reset token.
#[derive(Debug, Clone, Default)]
pub struct RequestForm {
    identifier: String,
}

impl ResetForm for RequestForm {
    const ENDPOINT: Endpoint = Endpoint::Issue;

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.record(Field::Identifier, validate_identifier(&self.identifier));
        errors
    }

    fn payload(&self) -> ResetPayload {
        ResetPayload::Request(ResetRequestBody {
            identifier: self.identifier.clone(),
        })
    }

    fn rejected_fallback(messages: &Messages) -> &str {
        &messages.request_rejected
    }

    fn describe(&self) -> String {
        format!("identifier {}", mask(&self.identifier))
    }
}

/// Flow that submits an account identifier to the issuance endpoint.
pub type ResetRequestFlow<T> = ResetFlow<RequestForm, T>;

impl<T: ResetTransport + ?Sized> ResetFlow<RequestForm, T> {
    pub fn set_identifier(&self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        self.edit(|form| form.identifier = identifier);
    }

    pub fn identifier(&self) -> String {
        self.read(|form| form.identifier.clone())
    }
}
