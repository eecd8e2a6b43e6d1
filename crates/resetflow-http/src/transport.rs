//! `ResetTransport` backed by a real HTTP client. Each submission is a single
//! JSON `POST`; the response is folded into a `TransportResult` and never
//! retried.

use crate::parse::parse_rejection;
use async_trait::async_trait;
use log::{debug, warn};
use resetflow_core::config::ResetflowConfig;
use resetflow_core::error::{ResetflowError, ResetflowResult};
use resetflow_core::transport::{
    Endpoint, ResetPayload, ResetTransport, TransportError, TransportResult,
};
use std::time::Duration;
use url::Url;

/// Largest rejection body read before the response counts as malformed.
pub const MAX_REJECTION_BODY: usize = 64 * 1024;

/// User agent sent when the configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("resetflow/", env!("CARGO_PKG_VERSION"));

/// HTTP transport with both endpoint URLs resolved up front.
#[derive(Debug, Clone)]
pub struct HttpResetTransport {
    client: reqwest::Client,
    issue_url: Url,
    confirm_url: Url,
    timeout: Duration,
}

impl HttpResetTransport {
    /// Build a transport from the server and endpoint sections of `config`.
    pub fn from_config(config: &ResetflowConfig) -> ResetflowResult<Self> {
        let issue_url = config.endpoint_url(Endpoint::Issue)?;
        let confirm_url = config.endpoint_url(Endpoint::Confirm)?;
        let user_agent = config
            .server
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|err| {
                ResetflowError::Transport(format!("failed to build http client: {err}"))
            })?;

        Ok(Self {
            client,
            issue_url,
            confirm_url,
            timeout: config.request_timeout(),
        })
    }

    /// Override the per-request timeout taken from the configuration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Issue => &self.issue_url,
            Endpoint::Confirm => &self.confirm_url,
        }
    }

    /// Read at most [`MAX_REJECTION_BODY`] bytes; `None` when the body is larger.
    async fn read_capped(mut response: reqwest::Response) -> reqwest::Result<Option<Vec<u8>>> {
        if response
            .content_length()
            .is_some_and(|len| len > MAX_REJECTION_BODY as u64)
        {
            return Ok(None);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_REJECTION_BODY {
                return Ok(None);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Some(body))
    }

    /// Map a transport-level reqwest failure onto the error the flows expect.
    fn classify(err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Unreachable(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl ResetTransport for HttpResetTransport {
    async fn submit(&self, endpoint: Endpoint, payload: &ResetPayload) -> TransportResult {
        let url = self.url(endpoint);
        debug!("POST {url}");

        let response = match self
            .client
            .post(url.clone())
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return TransportResult::TransportFailure(Self::classify(&err)),
        };

        let status = response.status();
        if status.is_success() {
            debug!("{endpoint} answered {status}");
            return TransportResult::Ok;
        }

        let body = match Self::read_capped(response).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                warn!("{endpoint} answered {status} with a body over {MAX_REJECTION_BODY} bytes");
                return TransportResult::TransportFailure(TransportError::MalformedBody {
                    status: status.as_u16(),
                });
            }
            Err(err) => return TransportResult::TransportFailure(Self::classify(&err)),
        };

        match parse_rejection(&body) {
            Ok(detail) => {
                debug!("{endpoint} answered {status} with a rejection body");
                TransportResult::Rejected { detail }
            }
            Err(err) => {
                warn!("{endpoint} answered {status} with an unreadable body: {err}");
                TransportResult::TransportFailure(TransportError::MalformedBody {
                    status: status.as_u16(),
                })
            }
        }
    }
}
