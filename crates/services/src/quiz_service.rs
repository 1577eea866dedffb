use tracing::info;

use pycoder_core::model::{QuizId, QuizResult, QuizSubmission};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Sends completed answer sheets for scoring.
#[derive(Clone)]
pub struct QuizService {
    client: ApiClient,
}

impl QuizService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Submit answers for `quiz_id` and return the backend's scoring.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the result is malformed.
    pub async fn submit(
        &self,
        quiz_id: QuizId,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, ApiError> {
        let result: QuizResult = self
            .client
            .post(&format!("quizzes/{quiz_id}/submit/"), submission)
            .await?;
        info!(
            %quiz_id,
            score = result.score,
            passed = result.passed,
            "quiz scored"
        );
        Ok(result)
    }
}
