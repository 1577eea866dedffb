use pycoder_core::normalize::detail_message;
use services::ApiError;

/// Why a data view could not be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotFound,
    Server,
    Offline,
    /// Credentials were cleared; the user is being sent to the login page.
    SessionExpired,
    Message(String),
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ViewError::NotFound => "API endpoint not found. Check backend URL and routes.",
            ViewError::Server => "Backend server error.",
            ViewError::Offline => "Cannot connect to backend.",
            ViewError::SessionExpired => "Your session has expired. Please log in again.",
            ViewError::Message(message) => message.as_str(),
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&ApiError> for ViewError {
    fn from(err: &ApiError) -> Self {
        if err.is_network() {
            return ViewError::Offline;
        }
        if err.requires_login() {
            return ViewError::SessionExpired;
        }
        match err.status() {
            Some(status) if status.as_u16() == 404 => ViewError::NotFound,
            Some(status) if status.is_server_error() => ViewError::Server,
            Some(_) => detail_message(err.body()).map_or(ViewError::Unknown, ViewError::Message),
            None => ViewError::Message(err.to_string()),
        }
    }
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        ViewError::from(&err)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::Idle => ViewState::Idle,
            ViewState::Loading => ViewState::Loading,
            ViewState::Ready(data) => ViewState::Ready(f(data)),
            ViewState::Error(err) => ViewState::Error(err),
        }
    }
}

#[must_use]
pub fn view_state_from_result<T>(result: Result<T, ApiError>) -> ViewState<T> {
    match result {
        Ok(data) => ViewState::Ready(data),
        Err(err) => ViewState::Error(ViewError::from(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use services::ApiError;

    fn status(code: u16, body: Option<serde_json::Value>) -> ApiError {
        ApiError::Status {
            status: code.try_into().unwrap(),
            body,
        }
    }

    #[test]
    fn statuses_map_to_catalog_messages() {
        assert_eq!(
            ViewError::from(status(404, None)).message(),
            "API endpoint not found. Check backend URL and routes."
        );
        assert_eq!(
            ViewError::from(status(502, None)).message(),
            "Backend server error."
        );
        assert_eq!(
            ViewError::from(status(403, Some(json!({"detail": "Not allowed."})))),
            ViewError::Message("Not allowed.".into())
        );
        assert_eq!(ViewError::from(status(400, None)), ViewError::Unknown);
    }

    #[test]
    fn login_required_is_session_expired() {
        assert_eq!(
            ViewError::from(ApiError::LoginRequired),
            ViewError::SessionExpired
        );
    }

    #[test]
    fn view_state_wraps_results() {
        let ready = view_state_from_result::<u32>(Ok(3)).map(|n| n * 2);
        assert_eq!(ready.ready(), Some(&6));

        let failed = view_state_from_result::<u32>(Err(status(500, None)));
        assert_eq!(failed, ViewState::Error(ViewError::Server));
        assert!(!failed.is_loading());
    }
}
