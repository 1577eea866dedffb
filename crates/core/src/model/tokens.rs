use std::fmt;

use serde::{Deserialize, Serialize};

/// Access/refresh credential pair issued by `login/` and `register/`.
///
/// Both halves are stored and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Body of a successful `token/refresh/` call.
///
/// The backend rotates refresh tokens, so a replacement may accompany the new access token.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshedTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshedTokens")
            .field("access", &"<redacted>")
            .field("rotated", &self.refresh.is_some())
            .finish()
    }
}
