use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use pycoder_core::model::{Course, CourseDetail, CourseId, Pdf, Quiz, QuizAttempt, QuizId, QuizSummary};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Characters left as-is when a slug becomes one path segment.
const SLUG_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// List endpoints answer either with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Paged { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Paged { results } | ListPayload::Plain(results) => results,
        }
    }
}

/// Course and quiz lists fetched together for the dashboard.
///
/// Each half fails independently.
#[derive(Debug)]
pub struct Dashboard {
    pub courses: Result<Vec<Course>, ApiError>,
    pub quizzes: Result<Vec<QuizSummary>, ApiError>,
}

/// Read-only access to courses, PDFs, quizzes and past attempts.
#[derive(Clone)]
pub struct CatalogService {
    client: ApiClient,
}

impl CatalogService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All active courses.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        self.list("courses/", None).await
    }

    /// One course with its PDFs and quizzes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn course(&self, slug: &str) -> Result<CourseDetail, ApiError> {
        let slug = utf8_percent_encode(slug.trim(), SLUG_SEGMENT);
        self.client.get(&format!("courses/{slug}/")).await
    }

    /// PDFs, optionally restricted to one course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn pdfs(&self, course: Option<CourseId>) -> Result<Vec<Pdf>, ApiError> {
        self.list("pdfs/", course).await
    }

    /// Quiz summaries, optionally restricted to one course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn quizzes(&self, course: Option<CourseId>) -> Result<Vec<QuizSummary>, ApiError> {
        self.list("quizzes/", course).await
    }

    /// A quiz with its questions and choices, without correct answers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        self.client.get(&format!("quizzes/{id}/")).await
    }

    /// The signed-in user's past attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn attempts(&self) -> Result<Vec<QuizAttempt>, ApiError> {
        self.list("quiz-attempts/", None).await
    }

    /// Courses and quizzes, requested concurrently.
    pub async fn dashboard(&self) -> Dashboard {
        let (courses, quizzes) = tokio::join!(self.courses(), self.quizzes(None));
        Dashboard { courses, quizzes }
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        course: Option<CourseId>,
    ) -> Result<Vec<T>, ApiError> {
        let payload: ListPayload<T> = match course {
            Some(course) => {
                self.client
                    .get_query(path, &[("course", course.to_string())])
                    .await?
            }
            None => self.client.get(path).await?,
        };
        let items = payload.into_vec();
        debug!(path, count = items.len(), "fetched list");
        Ok(items)
    }
}
