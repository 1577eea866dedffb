use std::sync::Arc;

use pycoder_core::model::QuizId;
use services::{AuthSession, CatalogService, Clock, QuizFlow, QuizService, SessionSnapshot};

use crate::routes::{Route, RouteDecision};

/// What the composition root hands to the view layer.
pub trait UiApp: Send + Sync {
    fn clock(&self) -> Clock;

    fn session(&self) -> Arc<AuthSession>;
    fn catalog(&self) -> Arc<CatalogService>;
    fn quizzes(&self) -> Arc<QuizService>;
}

/// Explicit holder of the session and data services for every view.
#[derive(Clone)]
pub struct AppContext {
    clock: Clock,
    session: Arc<AuthSession>,
    catalog: Arc<CatalogService>,
    quizzes: Arc<QuizService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            clock: app.clock(),
            session: app.session(),
            catalog: app.catalog(),
            quizzes: app.quizzes(),
        }
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

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Apply the auth guards to `route` using the current session.
    #[must_use]
    pub fn navigate(&self, route: Route) -> RouteDecision {
        route.resolve(&self.snapshot())
    }

    /// A new attempt for `quiz_id`, waiting to be loaded.
    #[must_use]
    pub fn quiz_flow(&self, quiz_id: QuizId) -> QuizFlow {
        QuizFlow::new(quiz_id, self.clock)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::{ApiConfig, AppServices, NoRedirect};

    struct TestApp(AppServices);

    impl UiApp for TestApp {
        fn clock(&self) -> Clock {
            self.0.clock()
        }

        fn session(&self) -> Arc<AuthSession> {
            self.0.session()
        }

        fn catalog(&self) -> Arc<CatalogService> {
            self.0.catalog()
        }

        fn quizzes(&self) -> Arc<QuizService> {
            self.0.quizzes()
        }
    }

    fn context() -> AppContext {
        let config = ApiConfig::new("http://127.0.0.1:9/api/").unwrap();
        let services =
            AppServices::in_memory(config, Arc::new(NoRedirect), pycoder_core::time::fixed_clock())
                .unwrap();
        let app: Arc<dyn UiApp> = Arc::new(TestApp(services));
        build_app_context(&app)
    }

    #[test]
    fn context_shares_one_session() {
        let ctx = context();
        assert!(Arc::ptr_eq(&ctx.session(), &ctx.clone().session()));
        assert!(ctx.snapshot().loading);
    }

    #[test]
    fn guards_use_the_live_session() {
        let ctx = context();
        assert_eq!(ctx.navigate(Route::Courses), RouteDecision::Loading);
        assert_eq!(
            ctx.navigate(Route::Login),
            RouteDecision::Render(Route::Login)
        );
    }

    #[test]
    fn quiz_flow_starts_loading() {
        let flow = context().quiz_flow(QuizId::new(3));
        assert_eq!(flow.quiz_id(), QuizId::new(3));
        assert_eq!(flow.phase().name(), "loading");
    }
}
