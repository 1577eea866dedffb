//! Shared error types for the services crate.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use pycoder_core::model::AnswerError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors from configuration values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base URL {raw:?}: {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL must use http or https, got {0:?}")]
    UnsupportedScheme(String),
    #[error("invalid endpoint path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid HTTP timeout {0:?}")]
    InvalidTimeout(String),
}

/// Errors emitted by `ApiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No response was received.
    #[error("could not reach the server: {0}")]
    Network(#[source] reqwest::Error),
    /// Credentials are gone; the user must sign in again.
    #[error("your session has expired, please log in again")]
    LoginRequired,
    /// The refresh endpoint refused the stored refresh token.
    #[error("token refresh was rejected with status {status}")]
    RefreshRejected {
        status: StatusCode,
        body: Option<Value>,
    },
    /// The backend answered with a non-success status.
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to build HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } | ApiError::RefreshRejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Parsed JSON error body, if the backend sent one.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } | ApiError::RefreshRejected { body, .. } => {
                body.as_ref()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// True when the failure ended with credentials cleared.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::LoginRequired | ApiError::RefreshRejected { .. }
        )
    }
}

/// Local signup form problems caught before any request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SignupValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Errors emitted by `AuthSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] SignupValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    /// Local precondition failed; nothing was sent.
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error("cannot {action} while the quiz is {phase}")]
    InvalidState {
        action: &'static str,
        phase: &'static str,
    },
    #[error("Failed to load quiz")]
    Load(#[source] ApiError),
    #[error("{message}")]
    Submit {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
