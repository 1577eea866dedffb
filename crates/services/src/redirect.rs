use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Route the host should show once credentials are gone.
pub const LOGIN_ROUTE: &str = "/login";

/// Receives the "send the user to the login screen" signal.
///
/// Raised by `ApiClient` after it clears stored credentials because a 401
/// could not be resolved by a token refresh.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Ignores redirect signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRedirect;

impl LoginRedirect for NoRedirect {
    fn redirect_to_login(&self) {}
}

/// Counts redirect signals so callers can react after a request returns.
#[derive(Debug, Clone, Default)]
pub struct RedirectRecorder {
    count: Arc<AtomicUsize>,
}

impl RedirectRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn was_triggered(&self) -> bool {
        self.count() > 0
    }

    /// Returns whether a redirect was pending, and resets the counter.
    pub fn take(&self) -> bool {
        self.count.swap(0, Ordering::AcqRel) > 0
    }
}

impl LoginRedirect for RedirectRecorder {
    fn redirect_to_login(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_counts_and_resets() {
        let recorder = RedirectRecorder::new();
        let shared: Arc<dyn LoginRedirect> = Arc::new(recorder.clone());
        assert!(!recorder.was_triggered());

        shared.redirect_to_login();
        shared.redirect_to_login();
        assert_eq!(recorder.count(), 2);

        assert!(recorder.take());
        assert!(!recorder.take());
        assert_eq!(recorder.count(), 0);
    }
}
