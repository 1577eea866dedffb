use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AttemptId, QuestionId, QuizId};

/// Scored outcome returned by `POST quizzes/{id}/submit/`. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<AttemptId>,
    pub score: u32,
    pub passed: bool,
    pub correct_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub results: Vec<QuestionResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
    pub question_text: String,
    pub user_answer: Option<String>,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
}

/// Past attempt from `GET quiz-attempts/`, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub quiz: QuizId,
    #[serde(default)]
    pub quiz_title: String,
    pub score: u32,
    pub total_questions: u32,
    #[serde(default, deserialize_with = "crate::model::timestamp::lenient")]
    pub completed_at: Option<DateTime<Utc>>,
}
