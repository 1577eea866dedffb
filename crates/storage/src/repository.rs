use async_trait::async_trait;
use pycoder_core::model::TokenPair;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key under which the refresh token is persisted.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistent home of the access/refresh credential pair.
///
/// Writers are the authenticated client (after a refresh) and the auth
/// session (login, signup, logout). Everything else only reads.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn access_token(&self) -> Result<Option<String>, StorageError>;

    /// Current refresh token, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn refresh_token(&self) -> Result<Option<String>, StorageError>;

    /// Replace both tokens.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the tokens cannot be stored.
    async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError>;

    /// Replace only the access token, keeping the refresh token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be stored.
    async fn save_access_token(&self, access: &str) -> Result<(), StorageError>;

    /// Replace only the refresh token (rotation).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be stored.
    async fn save_refresh_token(&self, refresh: &str) -> Result<(), StorageError>;

    /// Remove both tokens. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-memory token store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<Mutex<StoredTokens>>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token pair.
    #[must_use]
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(StoredTokens {
                access: Some(tokens.access.clone()),
                refresh: Some(tokens.refresh.clone()),
            })),
        }
    }

    fn with_guard<T>(&self, f: impl FnOnce(&mut StoredTokens) -> T) -> Result<T, StorageError> {
        let mut guard = self
            .tokens
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.with_guard(|tokens| tokens.access.clone())
    }

    async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.with_guard(|tokens| tokens.refresh.clone())
    }

    async fn save_tokens(&self, pair: &TokenPair) -> Result<(), StorageError> {
        self.with_guard(|tokens| {
            tokens.access = Some(pair.access.clone());
            tokens.refresh = Some(pair.refresh.clone());
        })
    }

    async fn save_access_token(&self, access: &str) -> Result<(), StorageError> {
        self.with_guard(|tokens| tokens.access = Some(access.to_owned()))
    }

    async fn save_refresh_token(&self, refresh: &str) -> Result<(), StorageError> {
        self.with_guard(|tokens| tokens.refresh = Some(refresh.to_owned()))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.with_guard(|tokens| *tokens = StoredTokens::default())
    }
}

/// Storage handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub tokens: Arc<dyn TokenStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
        Self { tokens }
    }
}
