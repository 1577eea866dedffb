use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth_session::AuthSession;
use crate::catalog_service::CatalogService;
use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::AppServicesError;
use crate::quiz_flow::QuizFlow;
use crate::quiz_service::QuizService;
use crate::redirect::LoginRedirect;
use pycoder_core::model::QuizId;

/// Assembles the app-facing services around one shared client.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    client: ApiClient,
    session: Arc<AuthSession>,
    catalog: Arc<CatalogService>,
    quizzes: Arc<QuizService>,
}

impl AppServices {
    /// Build services over an existing storage aggregate.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Api` if the HTTP client cannot be built.
    pub fn new(
        config: ApiConfig,
        storage: &Storage,
        redirect: Arc<dyn LoginRedirect>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let client = ApiClient::new(config, Arc::clone(&storage.tokens), redirect)?;
        let session = Arc::new(AuthSession::new(client.clone()));
        let catalog = Arc::new(CatalogService::new(client.clone()));
        let quizzes = Arc::new(QuizService::new(client.clone()));

        Ok(Self {
            clock,
            client,
            session,
            catalog,
            quizzes,
        })
    }

    /// Build services with credentials persisted in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or client setup fails.
    pub async fn new_sqlite(
        config: ApiConfig,
        db_url: &str,
        redirect: Arc<dyn LoginRedirect>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url, clock).await?;
        Self::new(config, &storage, redirect, clock)
    }

    /// Build services with credentials kept only in memory.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Api` if the HTTP client cannot be built.
    pub fn in_memory(
        config: ApiConfig,
        redirect: Arc<dyn LoginRedirect>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        Self::new(config, &Storage::in_memory(), redirect, clock)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> Arc<AuthSession> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    /// A fresh attempt for `quiz_id`, waiting to be loaded.
    #[must_use]
    pub fn quiz_flow(&self, quiz_id: QuizId) -> QuizFlow {
        QuizFlow::new(quiz_id, self.clock)
    }
}
