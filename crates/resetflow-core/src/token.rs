//! Reset token captured from the navigation context (usually the emailed link).

use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// Route segments that may be followed by the token in a reset link path.
pub const RESET_ROUTES: &[&str] = &["password-reset", "reset-password"];

/// Opaque bearer credential issued by the server.
///
/// The client never inspects its structure or expiry; it only forwards it. An
/// absent token is still a valid value so a confirm flow can always be built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResetToken(String);

impl ResetToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build from whatever the navigation context supplied, if anything.
    pub fn from_context(value: Option<String>) -> Self {
        Self(value.unwrap_or_default())
    }

    /// Pull the token out of a reset link.
    ///
    /// Accepts `…/reset-password?token=<t>` as well as a token segment
    /// directly after one of [`RESET_ROUTES`] (`…/password-reset/<t>`). Both
    /// forms are percent-decoded. Anything else yields an absent token
    /// instead of an error.
    pub fn from_link(link: &str) -> Self {
        let Ok(url) = Url::parse(link.trim()) else {
            return Self::default();
        };

        if let Some((_, value)) = url.query_pairs().find(|(key, _)| key == "token") {
            return Self(value.into_owned());
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [.., route, token] if RESET_ROUTES.contains(route) => {
                Self(percent_decode_str(token).decode_utf8_lossy().into_owned())
            }
            _ => Self::default(),
        }
    }

    pub fn is_present(&self) -> bool {
        !self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            f.write_str("ResetToken(<redacted>)")
        } else {
            f.write_str("ResetToken(<absent>)")
        }
    }
}
