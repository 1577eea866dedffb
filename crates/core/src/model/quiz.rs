use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ChoiceId, CourseId, QuestionId, QuizId};

const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;
const DEFAULT_PASSING_SCORE: u32 = 70;

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_MINUTES
}

fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}

/// Quiz listing entry from `GET quizzes/` and course detail payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub course: Option<CourseId>,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default, deserialize_with = "crate::model::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A quiz with its ordered questions, from `GET quizzes/{id}/`.
///
/// Correct answers are never part of this payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub course: Option<CourseId>,
    #[serde(default)]
    pub course_title: Option<String>,
    /// Minutes.
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
    /// Percentage required to pass.
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, deserialize_with = "crate::model::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::minutes(i64::from(self.time_limit))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question_text", alias = "text")]
    pub text: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    #[must_use]
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }

    #[must_use]
    pub fn has_choice(&self, id: ChoiceId) -> bool {
        self.choice(id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    #[serde(rename = "choice_text", alias = "text")]
    pub text: String,
    #[serde(default)]
    pub order: i32,
}
