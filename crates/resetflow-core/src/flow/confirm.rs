use super::{ResetFlow, ResetForm};
use crate::config::Messages;
use crate::token::ResetToken;
use crate::transport::{Endpoint, ResetConfirmBody, ResetPayload, ResetTransport};
use crate::validation::{validate_credential, Field, FieldErrors};
use std::fmt;
use zeroize::Zeroizing;

/// Input for redeeming a reset token. The token is fixed at construction.
#[derive(Clone)]
pub struct ConfirmForm {
    token: ResetToken,
    new_credential: Zeroizing<String>,
}

impl ConfirmForm {
    pub fn new(token: ResetToken) -> Self {
        Self {
            token,
            new_credential: Zeroizing::new(String::new()),
        }
    }
}

impl fmt::Debug for ConfirmForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmForm")
            .field("token", &self.token)
            .field("new_credential", &"<redacted>")
            .finish()
    }
}

impl ResetForm for ConfirmForm {
    const ENDPOINT: Endpoint = Endpoint::Confirm;

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.record(Field::NewCredential, validate_credential(&self.new_credential));
        errors
    }

    // The server requires a token, so a blank one is settled locally.
    fn precondition(&self, messages: &Messages) -> Option<String> {
        (!self.token.is_present()).then(|| messages.missing_token.clone())
    }

    fn payload(&self) -> ResetPayload {
        ResetPayload::Confirm(ResetConfirmBody {
            token: self.token.as_str().to_string(),
            new_credential: self.new_credential.clone(),
        })
    }

    fn rejected_fallback(messages: &Messages) -> &str {
        &messages.confirm_rejected
    }

    fn describe(&self) -> String {
        if self.token.is_present() {
            "supplied reset token".to_string()
        } else {
            "missing reset token".to_string()
        }
    }
}

/// Flow that redeems a token together with a replacement password.
pub type ResetConfirmFlow<T> = ResetFlow<ConfirmForm, T>;

impl<T: ResetTransport + ?Sized> ResetFlow<ConfirmForm, T> {
    pub fn set_new_credential(&self, credential: impl Into<String>) {
        let credential = Zeroizing::new(credential.into());
        self.edit(|form| form.new_credential = credential);
    }

    pub fn token(&self) -> ResetToken {
        self.read(|form| form.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::testing::MockTransport;
    use crate::flow::{FlowOutcome, SubmitStatus};
    use crate::transport::{TransportError, TransportResult};
    use crate::validation::ValidationError;
    use std::sync::Arc;

    fn flow(token: ResetToken, transport: &Arc<MockTransport>) -> ResetConfirmFlow<MockTransport> {
        ResetFlow::new(ConfirmForm::new(token), transport.clone(), Messages::default())
    }

    #[tokio::test]
    async fn short_credential_is_blocked_locally() {
        let transport = Arc::new(MockTransport::new(vec![]));
        let flow = flow(ResetToken::new("tok123"), &transport);
        flow.set_new_credential("short");

        assert_eq!(flow.submit().await, SubmitStatus::Invalid);
        assert_eq!(flow.outcome(), FlowOutcome::Idle);
        assert_eq!(
            flow.field_errors().get(Field::NewCredential),
            Some(ValidationError::TooShort { min: 8 })
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn sends_token_and_credential_to_confirm_endpoint() {
        let transport = Arc::new(MockTransport::new(vec![TransportResult::Ok]));
        let flow = flow(ResetToken::new("tok123"), &transport);
        flow.set_new_credential("longenough1");

        assert_eq!(
            flow.submit().await,
            SubmitStatus::Resolved(FlowOutcome::Succeeded)
        );
        assert_eq!(
            transport.sent(),
            vec![(
                Endpoint::Confirm,
                serde_json::json!({ "token": "tok123", "newCredential": "longenough1" })
            )]
        );
    }

    #[tokio::test]
    async fn expired_token_rejection_is_surfaced() {
        let transport = Arc::new(MockTransport::new(vec![TransportResult::rejected(
            "Invalid or expired token",
        )]));
        let flow = flow(ResetToken::new("tok123"), &transport);
        flow.set_new_credential("longenough1");

        flow.submit().await;
        assert_eq!(
            flow.outcome(),
            FlowOutcome::Failed("Invalid or expired token".into())
        );
    }

    #[tokio::test]
    async fn rejection_without_detail_uses_confirm_fallback() {
        let transport = Arc::new(MockTransport::new(vec![TransportResult::Rejected {
            detail: None,
        }]));
        let flow = flow(ResetToken::new("tok123"), &transport);
        flow.set_new_credential("longenough1");

        flow.submit().await;
        assert_eq!(
            flow.outcome().detail(),
            Some("An error occurred while resetting the password.")
        );
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let transport = Arc::new(MockTransport::new(vec![]));
        let flow = flow(ResetToken::from_context(None), &transport);
        flow.set_new_credential("longenough1");

        for _ in 0..2 {
            assert_eq!(
                flow.submit().await,
                SubmitStatus::Resolved(FlowOutcome::Failed(
                    "Invalid or missing reset token.".into()
                ))
            );
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn missing_token_still_reports_field_errors_first() {
        let transport = Arc::new(MockTransport::new(vec![]));
        let flow = flow(ResetToken::new(""), &transport);

        assert_eq!(flow.submit().await, SubmitStatus::Invalid);
        assert_eq!(
            flow.field_errors().get(Field::NewCredential),
            Some(ValidationError::Required)
        );
        assert_eq!(flow.outcome(), FlowOutcome::Idle);
    }

    #[tokio::test]
    async fn transport_failure_maps_to_generic_message() {
        let transport = Arc::new(MockTransport::new(vec![TransportResult::TransportFailure(
            TransportError::Network("tls handshake eof".into()),
        )]));
        let flow = flow(ResetToken::new("tok123"), &transport);
        flow.set_new_credential("longenough1");

        flow.submit().await;
        assert_eq!(
            flow.outcome().detail(),
            Some("An unexpected error occurred. Please try again later.")
        );
    }

    #[tokio::test]
    async fn token_is_immutable_and_redacted() {
        let transport = Arc::new(MockTransport::new(vec![]));
        let flow = flow(ResetToken::new("tok123"), &transport);
        flow.set_new_credential("hunter2hunter2");

        assert_eq!(flow.token().as_str(), "tok123");
        let debug = flow.read(|form| format!("{form:?}"));
        assert!(!debug.contains("tok123"));
        assert!(!debug.contains("hunter2"));
    }
}
