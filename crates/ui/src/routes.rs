use std::fmt;

use pycoder_core::model::QuizId;
use services::{LOGIN_ROUTE, SessionSnapshot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Signup,
    Dashboard,
    Courses,
    CourseDetail { slug: String },
    Pdfs,
    Quiz { id: QuizId },
}

/// What to show for a requested route once the auth guards have run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
    /// The session is still resolving; show a spinner.
    Loading,
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".into(),
            Route::Login => LOGIN_ROUTE.into(),
            Route::Signup => "/signup".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Courses => "/courses".into(),
            Route::CourseDetail { slug } => format!("/courses/{slug}"),
            Route::Pdfs => "/pdfs".into(),
            Route::Quiz { id } => format!("/quiz/{id}"),
        }
    }

    /// Match a path such as `/courses/python-basics`. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Root),
            ["login"] => Some(Route::Login),
            ["signup"] => Some(Route::Signup),
            ["dashboard"] => Some(Route::Dashboard),
            ["courses"] => Some(Route::Courses),
            ["courses", slug] => Some(Route::CourseDetail {
                slug: (*slug).to_string(),
            }),
            ["pdfs"] => Some(Route::Pdfs),
            ["quiz", id] => id.parse().ok().map(|id| Route::Quiz { id }),
            _ => None,
        }
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Root | Route::Login | Route::Signup)
    }

    /// Apply the auth guards.
    ///
    /// Protected routes wait for the session and send signed-out users to
    /// `Login`; `Login`/`Signup` send signed-in users to `Dashboard`.
    #[must_use]
    pub fn resolve(self, session: &SessionSnapshot) -> RouteDecision {
        let signed_in = session.is_authenticated();
        match self {
            Route::Root if signed_in => RouteDecision::Redirect(Route::Dashboard),
            Route::Root => RouteDecision::Redirect(Route::Login),
            Route::Login | Route::Signup if signed_in => RouteDecision::Redirect(Route::Dashboard),
            Route::Login | Route::Signup => RouteDecision::Render(self),
            _ if session.loading => RouteDecision::Loading,
            _ if !signed_in => RouteDecision::Redirect(Route::Login),
            route => RouteDecision::Render(route),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
