use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
/// Refresh endpoint relative to the base URL.
///
/// Some deployments mount the refresh view outside the API prefix; those
/// override this value instead of the client carrying a second path.
pub const DEFAULT_REFRESH_PATH: &str = "token/refresh/";

pub const ENV_API_BASE_URL: &str = "PYCODER_API_BASE_URL";
pub const ENV_REFRESH_PATH: &str = "PYCODER_TOKEN_REFRESH_PATH";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PYCODER_HTTP_TIMEOUT_SECS";

/// Where the backend lives and how to reach its endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    refresh_path: String,
    timeout: Option<Duration>,
}

impl ApiConfig {
    /// Parse `base_url`, forcing a trailing `/` so relative paths nest under it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable or non-http(s) URLs.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        let base_url = Url::parse(&with_slash).map_err(|source| ConfigError::InvalidBaseUrl {
            raw: trimmed.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }

        Ok(Self {
            base_url,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout: None,
        })
    }

    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve from `PYCODER_*` environment variables, with defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present value is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base = non_empty(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let mut config = Self::new(&base)?;

        if let Some(path) = non_empty(ENV_REFRESH_PATH) {
            config = config.with_refresh_path(path);
        }

        if let Some(raw) = non_empty(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout(raw));
            }
            config = config.with_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(config)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute URL for an endpoint path. `"/login/"` and `"login/"` are the same.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPath` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        let relative = path.trim().trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|source| ConfigError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    /// Absolute URL of the token refresh endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPath` if the configured path cannot be joined.
    pub fn refresh_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&self.refresh_path)
    }
}
