use crate::error::{ResetflowError, ResetflowResult};
use crate::transport::Endpoint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Server {
    /// Origin the endpoint paths are resolved against, e.g. `https://app.example.com`.
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Endpoints {
    #[serde(default = "default_request_path")]
    pub request_path: String,

    #[serde(default = "default_confirm_path")]
    pub confirm_path: String,
}

fn default_request_path() -> String {
    "/api/auth/password-reset".to_string()
}

fn default_confirm_path() -> String {
    "/api/auth/password-reset/confirm".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            request_path: default_request_path(),
            confirm_path: default_confirm_path(),
        }
    }
}

impl Endpoints {
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Issue => &self.request_path,
            Endpoint::Confirm => &self.confirm_path,
        }
    }
}

/// User-facing copy substituted when the server gives no usable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Messages {
    #[serde(default = "default_generic_failure")]
    pub generic_failure: String,

    #[serde(default = "default_request_rejected")]
    pub request_rejected: String,

    #[serde(default = "default_confirm_rejected")]
    pub confirm_rejected: String,

    #[serde(default = "default_missing_token")]
    pub missing_token: String,
}

fn default_generic_failure() -> String {
    "An unexpected error occurred. Please try again later.".to_string()
}

fn default_request_rejected() -> String {
    "An error occurred while requesting a password reset.".to_string()
}

fn default_confirm_rejected() -> String {
    "An error occurred while resetting the password.".to_string()
}

fn default_missing_token() -> String {
    "Invalid or missing reset token.".to_string()
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            generic_failure: default_generic_failure(),
            request_rejected: default_request_rejected(),
            confirm_rejected: default_confirm_rejected(),
            missing_token: default_missing_token(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ResetflowConfig {
    #[serde(default)]
    pub server: Server,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub messages: Messages,

    #[serde(skip)]
    pub path: PathBuf,
}

impl ResetflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> ResetflowResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let mut cfg = if is_toml {
            toml::from_str::<Self>(&contents)?
        } else {
            serde_yaml::from_str::<Self>(&contents)?
        };

        cfg.path = path.to_path_buf();

        if cfg.server.base_url.trim().is_empty() {
            return Err(ResetflowError::InvalidConfig(
                "server.base_url must not be empty".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Collect every problem with the configuration instead of stopping at the first.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        match Url::parse(&self.server.base_url) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => issues.push(format!(
                "server.base_url must use http or https, got `{}`",
                url.scheme()
            )),
            Ok(_) => {}
            Err(err) => issues.push(format!(
                "server.base_url `{}` is not a valid URL: {err}",
                self.server.base_url
            )),
        }

        if self.server.timeout_secs == 0 {
            issues.push("server.timeout_secs must be greater than zero".to_string());
        }

        for (name, path) in [
            ("endpoints.request_path", &self.endpoints.request_path),
            ("endpoints.confirm_path", &self.endpoints.confirm_path),
        ] {
            if !path.starts_with('/') {
                issues.push(format!("{name} must start with `/`, got `{path}`"));
            }
        }

        for (name, text) in [
            ("messages.generic_failure", &self.messages.generic_failure),
            ("messages.request_rejected", &self.messages.request_rejected),
            ("messages.confirm_rejected", &self.messages.confirm_rejected),
            ("messages.missing_token", &self.messages.missing_token),
        ] {
            if text.trim().is_empty() {
                issues.push(format!("{name} must not be empty"));
            }
        }

        issues
    }

    pub fn base_url(&self) -> ResetflowResult<Url> {
        Url::parse(&self.server.base_url).map_err(|err| {
            ResetflowError::InvalidConfig(format!(
                "invalid server.base_url `{}`: {err}",
                self.server.base_url
            ))
        })
    }

    /// Absolute URL for `endpoint`, nested under any path prefix of the base.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> ResetflowResult<Url> {
        let path = self.endpoints.path(endpoint);
        let mut base = self.base_url()?;
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        base.join(path.trim_start_matches('/')).map_err(|err| {
            ResetflowError::InvalidConfig(format!("invalid endpoint path `{path}`: {err}"))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }
}
