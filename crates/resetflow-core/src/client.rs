//! Entry point that hands out reset flows wired to one transport and config.

use crate::config::ResetflowConfig;
use crate::flow::{ConfirmForm, RequestForm, ResetConfirmFlow, ResetFlow, ResetRequestFlow};
use crate::token::ResetToken;
use crate::transport::ResetTransport;
use std::sync::Arc;

/// Coordinates configuration and a transport to build reset flows.
///
/// Every flow it returns is an independent instance; no state is shared
/// between flows beyond the transport itself.
pub struct ResetClient<T: ResetTransport + ?Sized> {
    config: Arc<ResetflowConfig>,
    transport: Arc<T>,
}

impl<T: ResetTransport + ?Sized> Clone for ResetClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<T: ResetTransport + ?Sized> ResetClient<T> {
    pub fn new(config: Arc<ResetflowConfig>, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ResetflowConfig {
        &self.config
    }

    /// Fresh flow for requesting a reset token.
    pub fn request_flow(&self) -> ResetRequestFlow<T> {
        ResetFlow::new(
            RequestForm::default(),
            self.transport.clone(),
            self.config.messages.clone(),
        )
    }

    /// Fresh flow for redeeming `token`.
    pub fn confirm_flow(&self, token: ResetToken) -> ResetConfirmFlow<T> {
        ResetFlow::new(
            ConfirmForm::new(token),
            self.transport.clone(),
            self.config.messages.clone(),
        )
    }

    /// Confirm flow for the token carried by a reset link.
    pub fn confirm_flow_from_link(&self, link: &str) -> ResetConfirmFlow<T> {
        self.confirm_flow(ResetToken::from_link(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::testing::MockTransport;
    use crate::flow::{FlowOutcome, SubmitStatus};
    use crate::transport::{Endpoint, TransportResult};

    fn client(results: Vec<TransportResult>) -> (ResetClient<MockTransport>, Arc<MockTransport>) {
        let mut config = ResetflowConfig::default();
        config.messages.missing_token = "This reset link is no longer valid.".into();
        let transport = Arc::new(MockTransport::new(results));
        (
            ResetClient::new(Arc::new(config), transport.clone()),
            transport,
        )
    }

    #[tokio::test]
    async fn flows_are_independent_instances() {
        let (client, transport) = client(vec![TransportResult::rejected("User not found")]);
        let first = client.request_flow();
        let second = client.request_flow();
        first.set_identifier("ghost@example.com");

        first.submit().await;
        assert_eq!(first.outcome().detail(), Some("User not found"));
        assert_eq!(second.outcome(), FlowOutcome::Idle);
        assert_eq!(second.identifier(), "");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn confirm_flow_uses_configured_messages() {
        let (client, transport) = client(vec![]);
        let flow = client.confirm_flow_from_link("https://app.example.com/reset-password");
        flow.set_new_credential("longenough1");

        assert_eq!(
            flow.submit().await,
            SubmitStatus::Resolved(FlowOutcome::Failed(
                "This reset link is no longer valid.".into()
            ))
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn link_without_token_never_sends_credential() {
        let (client, transport) = client(vec![TransportResult::rejected("Invalid token")]);
        let flow = client.confirm_flow_from_link("https://app.example.com/auth/reset-password");
        flow.set_new_credential("longenough1");

        assert!(!flow.token().is_present());
        assert_eq!(
            flow.submit().await,
            SubmitStatus::Resolved(FlowOutcome::Failed(
                "This reset link is no longer valid.".into()
            ))
        );
        assert_eq!(transport.calls(), 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn confirm_flow_from_link_forwards_token() {
        let (client, transport) = client(vec![TransportResult::Ok]);
        let flow =
            client.confirm_flow_from_link("https://app.example.com/reset-password?token=tok123");
        flow.set_new_credential("longenough1");

        flow.submit().await;
        let sent = transport.sent();
        assert_eq!(sent[0].0, Endpoint::Confirm);
        assert_eq!(sent[0].1["token"], "tok123");
    }

    #[tokio::test]
    async fn works_with_trait_objects() {
        let transport: Arc<dyn ResetTransport> = Arc::new(MockTransport::new(vec![]));
        let client = ResetClient::new(Arc::new(ResetflowConfig::default()), transport);
        let flow = client.request_flow();
        flow.set_identifier("a@b.com");

        assert_eq!(
            flow.submit().await,
            SubmitStatus::Resolved(FlowOutcome::Succeeded)
        );
    }
}
