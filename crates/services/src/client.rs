//! Authenticated HTTP client for the course backend.
//!
//! Every request carries the stored access token as a bearer credential. A
//! 401 triggers one refresh through the refresh endpoint followed by one
//! replay of the original request. When no refresh token is stored, the
//! refresh is refused, or the replay is still unauthorized, stored
//! credentials are cleared and the login redirect is raised.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use storage::repository::TokenStore;
use tracing::{debug, info, warn};

use pycoder_core::model::RefreshedTokens;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::redirect::LoginRedirect;

/// A request is replayed at most this many times after refreshing credentials.
pub const MAX_AUTH_RETRIES: u8 = 1;

/// Method, path, query and JSON body of one logical request, replayable.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestSpec {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body parsed as JSON, or `None` if it is empty or not JSON.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        parse_body(&self.body)
    }

    /// Decode a success body, or turn a failure status into `ApiError::Status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for non-2xx responses and `ApiError::Decode`
    /// when the body does not match `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.status.is_success() {
            return Err(ApiError::Status {
                status: self.status,
                body: parse_body(&self.body),
            });
        }
        serde_json::from_slice(&self.body).map_err(ApiError::Decode)
    }
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    /// Build a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ClientSetup` if the HTTP client cannot be built.
    pub fn new(
        config: ApiConfig,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::ClientSetup)?;
        Ok(Self::with_http(http, config, tokens, redirect))
    }

    #[must_use]
    pub fn with_http(
        http: Client,
        config: ApiConfig,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            http,
            config,
            tokens,
            redirect,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, auth, status, or decode failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(&RequestSpec::get(path)).await?.into_json()
    }

    /// `GET path?key=value...` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, auth, status, or decode failures.
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let spec = query
            .iter()
            .fold(RequestSpec::get(path), |spec, (key, value)| {
                spec.with_query(*key, value)
            });
        self.send(&spec).await?.into_json()
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, auth, status, or decode failures.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::Decode)?;
        self.send(&RequestSpec::post(path, body)).await?.into_json()
    }

    /// Send `spec`, refreshing credentials and replaying once on a 401.
    ///
    /// Non-401 failure statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` when no response arrives and
    /// `ApiError::LoginRequired` / `ApiError::RefreshRejected` when the
    /// 401 could not be resolved.
    pub async fn send(&self, spec: &RequestSpec) -> Result<ApiResponse, ApiError> {
        self.send_with_retries(spec, 0).await
    }

    async fn send_with_retries(
        &self,
        spec: &RequestSpec,
        retries: u8,
    ) -> Result<ApiResponse, ApiError> {
        let response = self.dispatch(spec, retries).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if retries >= MAX_AUTH_RETRIES {
            warn!(path = spec.path(), "still unauthorized after token refresh");
            self.force_login().await;
            return Err(ApiError::LoginRequired);
        }

        debug!(path = spec.path(), "unauthorized; refreshing access token");
        self.refresh_access_token().await?;
        Box::pin(self.send_with_retries(spec, retries + 1)).await
    }

    async fn dispatch(&self, spec: &RequestSpec, retries: u8) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&spec.path)?;
        let mut request = self.http.request(spec.method.clone(), url);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        if let Some(token) = self.tokens.access_token().await? {
            request = request.bearer_auth(token);
        }

        debug!(method = %spec.method, path = spec.path(), retries, "sending request");
        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Network)?.to_vec();
        debug!(path = spec.path(), %status, "received response");

        Ok(ApiResponse { status, body })
    }

    /// Exchange the stored refresh token for a new access token and store it.
    ///
    /// On any failure the stored credentials are cleared and the login
    /// redirect is raised before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::LoginRequired` when no refresh token is stored,
    /// `ApiError::RefreshRejected` when the backend refuses it, or the
    /// transport/storage error that interrupted the exchange.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let Some(refresh) = self.tokens.refresh_token().await? else {
            warn!("no refresh token stored");
            self.force_login().await;
            return Err(ApiError::LoginRequired);
        };

        let refreshed = match self.request_refresh(&refresh).await {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                self.force_login().await;
                return Err(err);
            }
        };

        self.tokens.save_access_token(&refreshed.access).await?;
        if let Some(rotated) = &refreshed.refresh {
            self.tokens.save_refresh_token(rotated).await?;
        }
        info!(rotated = refreshed.refresh.is_some(), "access token refreshed");
        Ok(refreshed.access)
    }

    async fn request_refresh(&self, refresh: &str) -> Result<RefreshedTokens, ApiError> {
        let url = self.config.refresh_url()?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Network)?;
        if !status.is_success() {
            return Err(ApiError::RefreshRejected {
                status,
                body: parse_body(&body),
            });
        }
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }

    async fn force_login(&self) {
        if let Err(err) = self.tokens.clear().await {
            warn!(error = %err, "failed to clear stored tokens");
        }
        info!("credentials cleared; login required");
        self.redirect.redirect_to_login();
    }
}
