use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Server operations a reset flow can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Ask the server to issue a reset token for an account.
    Issue,
    /// Redeem a reset token together with the replacement password.
    Confirm,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Issue => f.write_str("password-reset"),
            Endpoint::Confirm => f.write_str("password-reset/confirm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequestBody {
    pub identifier: String,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfirmBody {
    pub token: String,
    #[serde(serialize_with = "serialize_secret")]
    pub new_credential: Zeroizing<String>,
}

impl fmt::Debug for ResetConfirmBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetConfirmBody")
            .field("token", &"<redacted>")
            .field("new_credential", &"<redacted>")
            .finish()
    }
}

fn serialize_secret<S>(value: &Zeroizing<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_str())
}

/// Body sent to one of the two endpoints. Serializes as the inner body only.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResetPayload {
    Request(ResetRequestBody),
    Confirm(ResetConfirmBody),
}

impl ResetPayload {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ResetPayload::Request(_) => Endpoint::Issue,
            ResetPayload::Confirm(_) => Endpoint::Confirm,
        }
    }
}

/// Why a request never produced a usable server answer.
///
/// The detail is meant for logs; users only ever see the generic message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unreadable response body (status {status})")]
    MalformedBody { status: u16 },
}

/// Single resolution of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportResult {
    /// The server accepted the request.
    Ok,
    /// The server declined; `detail` is its machine-readable reason, if any.
    Rejected { detail: Option<String> },
    /// No usable answer came back.
    TransportFailure(TransportError),
}

impl TransportResult {
    pub fn rejected(detail: impl Into<String>) -> Self {
        TransportResult::Rejected {
            detail: Some(detail.into()),
        }
    }
}

/// Boundary between the reset flows and the network.
///
/// One call is exactly one attempt: implementations must not retry, and every
/// failure has to come back as a [`TransportResult`] value rather than a panic.
#[async_trait]
pub trait ResetTransport: Send + Sync {
    async fn submit(&self, endpoint: Endpoint, payload: &ResetPayload) -> TransportResult;
}
