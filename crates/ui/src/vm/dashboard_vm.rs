use pycoder_core::model::User;
use services::Dashboard;

use crate::views::{ViewError, ViewState, view_state_from_result};
use crate::vm::course_vm::{CourseCardVm, map_course_cards};
use crate::vm::quiz_vm::{QuizCardVm, map_quiz_cards};

/// How many courses and quizzes the dashboard previews.
pub const DASHBOARD_LIMIT: usize = 6;

/// Name used in the welcome banner.
#[must_use]
pub fn welcome_name(user: Option<&User>) -> String {
    user.and_then(|user| {
        [&user.first_name, &user.username]
            .into_iter()
            .find(|name| !name.trim().is_empty())
            .cloned()
    })
    .unwrap_or_else(|| "Coder".to_owned())
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardVm {
    pub greeting: String,
    pub courses: ViewState<Vec<CourseCardVm>>,
    pub quizzes: ViewState<Vec<QuizCardVm>>,
}

impl DashboardVm {
    /// Failed halves are shown as empty lists, matching the page's
    /// "check back soon" empty states.
    #[must_use]
    pub fn new(user: Option<&User>, dashboard: Dashboard) -> Self {
        let courses = view_state_from_result(dashboard.courses)
            .map(|courses| map_course_cards(&courses[..courses.len().min(DASHBOARD_LIMIT)]));
        let quizzes = view_state_from_result(dashboard.quizzes)
            .map(|quizzes| map_quiz_cards(&quizzes[..quizzes.len().min(DASHBOARD_LIMIT)]));
        Self {
            greeting: format!("Welcome back, {}! 👋", welcome_name(user)),
            courses,
            quizzes,
        }
    }

    #[must_use]
    pub fn course_cards(&self) -> &[CourseCardVm] {
        self.courses.ready().map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn quiz_cards(&self) -> &[QuizCardVm] {
        self.quizzes.ready().map_or(&[][..], Vec::as_slice)
    }

    /// Errors worth surfacing, e.g. in a status line.
    #[must_use]
    pub fn errors(&self) -> Vec<&ViewError> {
        fn error_of<T>(state: &ViewState<T>) -> Option<&ViewError> {
            match state {
                ViewState::Error(err) => Some(err),
                _ => None,
            }
        }
        [error_of(&self.courses), error_of(&self.quizzes)]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pycoder_core::model::{Course, CourseId, CourseLevel, UserId};
    use services::ApiError;

    fn user(first: &str, username: &str) -> User {
        User {
            id: UserId::new(1),
            email: "ada@example.com".into(),
            username: username.into(),
            first_name: first.into(),
            last_name: String::new(),
        }
    }

    fn course(id: u64) -> Course {
        Course {
            id: CourseId::new(id),
            title: format!("Course {id}"),
            description: String::new(),
            slug: format!("course-{id}"),
            level: CourseLevel::Beginner,
            duration: String::new(),
            icon: String::new(),
            image: String::new(),
            pdf_count: 0,
            quiz_count: 0,
            created_at: None,
        }
    }

    #[test]
    fn welcome_name_prefers_first_name() {
        assert_eq!(welcome_name(Some(&user("Ada", "ada"))), "Ada");
        assert_eq!(welcome_name(Some(&user("", "ada"))), "ada");
        assert_eq!(welcome_name(None), "Coder");
    }

    #[test]
    fn previews_are_capped_and_failures_are_empty() {
        let dashboard = Dashboard {
            courses: Ok((1..=8).map(course).collect()),
            quizzes: Err(ApiError::LoginRequired),
        };
        let vm = DashboardVm::new(Some(&user("Ada", "ada")), dashboard);

        assert_eq!(vm.greeting, "Welcome back, Ada! 👋");
        assert_eq!(vm.course_cards().len(), DASHBOARD_LIMIT);
        assert!(vm.quiz_cards().is_empty());
        assert_eq!(vm.errors(), vec![&ViewError::SessionExpired]);
    }
}
