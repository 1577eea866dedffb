use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::repository::TokenStore;
use tracing::{debug, info, warn};

use pycoder_core::model::{TokenPair, User};
use pycoder_core::normalize::normalize_auth_error;

use crate::client::ApiClient;
use crate::error::{ApiError, AuthError, SignupValidationError};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    /// True until the startup user check has resolved.
    pub loading: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Result of a login or signup attempt that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(User),
    /// The backend refused the credentials; `message` is ready for display.
    Rejected { message: String },
}

impl AuthOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AuthOutcome::Authenticated(_) => None,
            AuthOutcome::Rejected { message } => Some(message),
        }
    }
}

/// Registration fields as the backend expects them.
#[derive(Clone, Default, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

impl SignupForm {
    /// Check required fields and the password confirmation locally.
    ///
    /// # Errors
    ///
    /// Returns `SignupValidationError` for the first problem found.
    pub fn validate(&self) -> Result<(), SignupValidationError> {
        for (name, value) in [
            ("Email", &self.email),
            ("Username", &self.username),
            ("Password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(SignupValidationError::MissingField(name));
            }
        }
        if self.password != self.password2 {
            return Err(SignupValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("password2", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    user: User,
    tokens: TokenPair,
}

/// Current-user state plus the login/signup/logout operations.
///
/// One instance is created at startup and handed to every consumer that
/// needs to know who is signed in.
pub struct AuthSession {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: RwLock<SessionSnapshot>,
}

impl AuthSession {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let tokens = client.tokens();
        Self {
            client,
            tokens,
            state: RwLock::new(SessionSnapshot::default()),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Startup restore from persisted credentials.
    ///
    /// An access token leads straight to `fetch_user`. A refresh token on
    /// its own is first exchanged for a new access token. With neither, the
    /// session settles signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token store cannot be read or cleared.
    pub async fn restore(&self) -> Result<Option<User>, AuthError> {
        if self.tokens.access_token().await?.is_some() {
            debug!("access token found; fetching user");
            return self.fetch_user().await;
        }

        if self.tokens.refresh_token().await?.is_some() {
            debug!("only a refresh token found; refreshing silently");
            match self.client.refresh_access_token().await {
                Ok(_) => return self.fetch_user().await,
                Err(err) => {
                    warn!(error = %err, "silent session restore failed");
                    self.set_state(None, false);
                    return Ok(None);
                }
            }
        }

        self.set_state(None, false);
        Ok(None)
    }

    /// Load the signed-in user. Any failure signs the session out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if clearing credentials after a failure fails.
    pub async fn fetch_user(&self) -> Result<Option<User>, AuthError> {
        match self.client.get::<User>("user/").await {
            Ok(user) => {
                info!(user_id = %user.id, "session restored");
                self.set_state(Some(user.clone()), false);
                Ok(Some(user))
            }
            Err(err) => {
                warn!(error = %err, "fetching current user failed; signing out");
                let cleared = self.logout().await;
                self.write_state().loading = false;
                cleared.map(|()| None)
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Backend rejections come back as `AuthOutcome::Rejected` with a
    /// normalized message.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` when the backend could not be reached or sent
    /// an unreadable success body, and `AuthError::Storage` if the tokens
    /// cannot be saved.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let body = json!({ "email": email, "password": password });
        let result = self.client.post::<_, AuthPayload>("login/", &body).await;
        self.complete_auth(result, LOGIN_FAILED).await
    }

    /// Register a new account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` before any request when the form is
    /// incomplete or the passwords differ; otherwise as for `login`.
    pub async fn signup(&self, form: &SignupForm) -> Result<AuthOutcome, AuthError> {
        form.validate()?;
        let result = self.client.post::<_, AuthPayload>("register/", form).await;
        self.complete_auth(result, REGISTRATION_FAILED).await
    }

    /// Clear stored tokens and the session user. Safe to call when signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token store cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.write_state().user = None;
        self.tokens.clear().await?;
        info!("signed out");
        Ok(())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().user.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read_state().clone()
    }

    async fn complete_auth(
        &self,
        result: Result<AuthPayload, ApiError>,
        fallback: &str,
    ) -> Result<AuthOutcome, AuthError> {
        match result {
            Ok(AuthPayload { user, tokens }) => {
                self.tokens.save_tokens(&tokens).await?;
                info!(user_id = %user.id, "signed in");
                self.set_state(Some(user.clone()), false);
                Ok(AuthOutcome::Authenticated(user))
            }
            Err(err @ (ApiError::Status { .. } | ApiError::RefreshRejected { .. })) => {
                let message = normalize_auth_error(err.body(), fallback);
                debug!(status = ?err.status(), %message, "credentials rejected");
                Ok(AuthOutcome::Rejected { message })
            }
            Err(ApiError::LoginRequired) => Ok(AuthOutcome::Rejected {
                message: fallback.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn set_state(&self, user: Option<User>, loading: bool) {
        *self.write_state() = SessionSnapshot { user, loading };
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionSnapshot> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionSnapshot> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
