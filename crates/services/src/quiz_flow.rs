//! One quiz attempt from loading to scoring.
//!
//! `Loading -> Ready -> Submitting -> Scored`, with `Submitting -> Failed`
//! falling back to `Ready` on the next edit. Incomplete answer sheets never
//! leave `Ready`.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use pycoder_core::model::{AnswerSheet, ChoiceId, QuestionId, Quiz, QuizId, QuizResult};
use pycoder_core::normalize::normalize_submit_error;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::QuizFlowError;
use crate::quiz_service::QuizService;

pub const LOAD_FAILED: &str = "Failed to load quiz";
pub const SUBMIT_FAILED: &str = "Failed to submit quiz";

#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    Loading,
    LoadFailed(String),
    Ready,
    Submitting,
    Scored(QuizResult),
    Failed(String),
}

impl QuizPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            QuizPhase::Loading => "loading",
            QuizPhase::LoadFailed(_) => "load failed",
            QuizPhase::Ready => "ready",
            QuizPhase::Submitting => "submitting",
            QuizPhase::Scored(_) => "scored",
            QuizPhase::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizFlow {
    quiz_id: QuizId,
    clock: Clock,
    quiz: Option<Quiz>,
    answers: AnswerSheet,
    phase: QuizPhase,
    started_at: Option<DateTime<Utc>>,
    notice: Option<String>,
}

impl QuizFlow {
    /// A flow waiting for `load`.
    #[must_use]
    pub fn new(quiz_id: QuizId, clock: Clock) -> Self {
        Self {
            quiz_id,
            clock,
            quiz: None,
            answers: AnswerSheet::new(),
            phase: QuizPhase::Loading,
            started_at: None,
            notice: None,
        }
    }

    /// A flow for an already fetched quiz, ready for answers.
    #[must_use]
    pub fn from_quiz(quiz: Quiz, clock: Clock) -> Self {
        let mut flow = Self::new(quiz.id, clock);
        flow.start(quiz);
        flow
    }

    /// Fetch the quiz. Allowed while loading or after a failed load.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::InvalidState` outside `Loading`/`LoadFailed`
    /// and `QuizFlowError::Load` when the fetch fails.
    pub async fn load(&mut self, catalog: &CatalogService) -> Result<(), QuizFlowError> {
        if !matches!(self.phase, QuizPhase::Loading | QuizPhase::LoadFailed(_)) {
            return Err(self.invalid("load"));
        }
        self.phase = QuizPhase::Loading;

        match catalog.quiz(self.quiz_id).await {
            Ok(quiz) => {
                debug!(quiz_id = %self.quiz_id, questions = quiz.question_count(), "quiz loaded");
                self.start(quiz);
                Ok(())
            }
            Err(err) => {
                warn!(quiz_id = %self.quiz_id, error = %err, "loading quiz failed");
                self.phase = QuizPhase::LoadFailed(LOAD_FAILED.to_string());
                Err(QuizFlowError::Load(err))
            }
        }
    }

    /// Choose `choice` for `question`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::InvalidState` unless the quiz is ready (or
    /// showing a submit failure), and `QuizFlowError::Answer` for ids that
    /// do not belong to the quiz.
    pub fn select(&mut self, question: QuestionId, choice: ChoiceId) -> Result<(), QuizFlowError> {
        self.resume_editing("select an answer")?;
        let quiz = self.quiz.as_ref().ok_or_else(|| self.invalid("select an answer"))?;
        self.answers.select(quiz, question, choice)?;
        self.notice = None;
        Ok(())
    }

    /// Validate locally, then send the answers for scoring.
    ///
    /// An incomplete sheet is rejected without contacting the backend and
    /// leaves the flow in `Ready` with the message in `notice()`.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Answer` for an incomplete sheet,
    /// `QuizFlowError::Submit` with a display message when the backend
    /// rejects the submission, or `QuizFlowError::InvalidState`.
    pub async fn submit(&mut self, service: &QuizService) -> Result<QuizResult, QuizFlowError> {
        self.resume_editing("submit")?;
        let quiz = self.quiz.as_ref().ok_or_else(|| self.invalid("submit"))?;

        let submission = match self.answers.to_submission(quiz) {
            Ok(submission) => submission,
            Err(err) => {
                self.notice = Some(err.to_string());
                return Err(err.into());
            }
        };

        self.notice = None;
        self.phase = QuizPhase::Submitting;
        match service.submit(self.quiz_id, &submission).await {
            Ok(result) => {
                self.phase = QuizPhase::Scored(result.clone());
                Ok(result)
            }
            Err(err) => {
                let message = normalize_submit_error(err.body(), SUBMIT_FAILED);
                warn!(quiz_id = %self.quiz_id, error = %err, %message, "quiz submission failed");
                self.phase = QuizPhase::Failed(message.clone());
                Err(QuizFlowError::Submit {
                    message,
                    source: err,
                })
            }
        }
    }

    /// Start over after scoring: answers are cleared and the timer restarts.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::InvalidState` unless the quiz was scored.
    pub fn retake(&mut self) -> Result<(), QuizFlowError> {
        if !matches!(self.phase, QuizPhase::Scored(_)) {
            return Err(self.invalid("retake"));
        }
        self.answers.clear();
        self.notice = None;
        self.started_at = Some(self.clock.now());
        self.phase = QuizPhase::Ready;
        info!(quiz_id = %self.quiz_id, "quiz retake started");
        Ok(())
    }

    /// Clear a shown error. A failed submission returns to `Ready`.
    pub fn dismiss_error(&mut self) {
        self.notice = None;
        if matches!(self.phase, QuizPhase::Failed(_)) {
            self.phase = QuizPhase::Ready;
        }
    }

    /// Answered and total question counts.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let total = self.quiz.as_ref().map_or(0, Quiz::question_count);
        (self.answers.len(), total)
    }

    /// Time left on the quiz's limit, counted from when it became ready.
    ///
    /// The backend does not enforce the limit; this is for display.
    #[must_use]
    pub fn time_remaining(&self) -> Option<Duration> {
        let quiz = self.quiz.as_ref()?;
        let started_at = self.started_at?;
        let left = quiz.time_limit() - self.clock.elapsed_since(started_at);
        Some(left.max(Duration::zero()))
    }

    #[must_use]
    pub fn is_time_up(&self) -> bool {
        self.time_remaining().is_some_and(|left| left.is_zero())
    }

    /// Message to show next to the form: a local validation problem or the
    /// last load/submit failure.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        if let Some(notice) = &self.notice {
            return Some(notice);
        }
        match &self.phase {
            QuizPhase::LoadFailed(message) | QuizPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            QuizPhase::Scored(result) => Some(result),
            _ => None,
        }
    }

    /// Mutable clock access, e.g. to advance a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn start(&mut self, quiz: Quiz) {
        self.quiz_id = quiz.id;
        self.quiz = Some(quiz);
        self.answers.clear();
        self.notice = None;
        self.started_at = Some(self.clock.now());
        self.phase = QuizPhase::Ready;
    }

    fn resume_editing(&mut self, action: &'static str) -> Result<(), QuizFlowError> {
        match self.phase {
            QuizPhase::Ready => Ok(()),
            QuizPhase::Failed(_) => {
                self.phase = QuizPhase::Ready;
                Ok(())
            }
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> QuizFlowError {
        QuizFlowError::InvalidState {
            action,
            phase: self.phase.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pycoder_core::model::{Choice, Question};
    use pycoder_core::time::fixed_clock;
    use storage::repository::InMemoryTokenStore;

    use crate::client::ApiClient;
    use crate::config::ApiConfig;
    use crate::error::ApiError;
    use crate::redirect::NoRedirect;

    fn quiz(questions: u64) -> Quiz {
        Quiz {
            id: QuizId::new(7),
            title: "Python Basics".into(),
            description: String::new(),
            course: None,
            course_title: None,
            time_limit: 10,
            passing_score: 70,
            questions: (1..=questions)
                .map(|q| Question {
                    id: QuestionId::new(q),
                    text: format!("Question {q}"),
                    order: i32::try_from(q).unwrap_or_default(),
                    choices: (1..=3)
                        .map(|c| Choice {
                            id: ChoiceId::new(q * 10 + c),
                            text: format!("Choice {c}"),
                            order: i32::try_from(c).unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
            created_at: None,
        }
    }

    fn offline_quiz_service() -> QuizService {
        let config = ApiConfig::new("http://127.0.0.1:9/api/").unwrap();
        let client = ApiClient::new(
            config,
            Arc::new(InMemoryTokenStore::new()),
            Arc::new(NoRedirect),
        )
        .unwrap();
        QuizService::new(client)
    }

    #[test]
    fn from_quiz_starts_ready_with_empty_sheet() {
        let flow = QuizFlow::from_quiz(quiz(3), fixed_clock());
        assert_eq!(flow.phase(), &QuizPhase::Ready);
        assert_eq!(flow.progress(), (0, 3));
        assert_eq!(flow.time_remaining(), Some(Duration::minutes(10)));
    }

    #[test]
    fn select_rejects_foreign_ids_and_replaces_choices() {
        let mut flow = QuizFlow::from_quiz(quiz(2), fixed_clock());
        assert!(matches!(
            flow.select(QuestionId::new(9), ChoiceId::new(11)),
            Err(QuizFlowError::Answer(_))
        ));
        assert!(matches!(
            flow.select(QuestionId::new(1), ChoiceId::new(21)),
            Err(QuizFlowError::Answer(_))
        ));

        flow.select(QuestionId::new(1), ChoiceId::new(11)).unwrap();
        flow.select(QuestionId::new(1), ChoiceId::new(12)).unwrap();
        assert_eq!(flow.progress(), (1, 2));
        assert_eq!(
            flow.answers().selected(QuestionId::new(1)),
            Some(ChoiceId::new(12))
        );
    }

    #[tokio::test]
    async fn incomplete_sheet_is_rejected_before_sending() {
        let mut flow = QuizFlow::from_quiz(quiz(3), fixed_clock());
        flow.select(QuestionId::new(1), ChoiceId::new(11)).unwrap();
        flow.select(QuestionId::new(2), ChoiceId::new(21)).unwrap();

        let err = flow.submit(&offline_quiz_service()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please answer all 3 questions before submitting."
        );
        assert_eq!(flow.phase(), &QuizPhase::Ready);
        assert_eq!(
            flow.error_message(),
            Some("Please answer all 3 questions before submitting.")
        );
    }

    #[test]
    fn actions_outside_ready_are_invalid() {
        let mut flow = QuizFlow::new(QuizId::new(7), fixed_clock());
        assert!(matches!(
            flow.select(QuestionId::new(1), ChoiceId::new(11)),
            Err(QuizFlowError::InvalidState { phase: "loading", .. })
        ));
        assert!(matches!(
            flow.retake(),
            Err(QuizFlowError::InvalidState { action: "retake", .. })
        ));
        assert_eq!(flow.progress(), (0, 0));
        assert_eq!(flow.time_remaining(), None);
    }

    #[test]
    fn failed_submission_returns_to_ready_on_next_edit() {
        let mut flow = QuizFlow::from_quiz(quiz(1), fixed_clock());
        flow.phase = QuizPhase::Failed("Quiz has no questions".into());
        assert_eq!(flow.error_message(), Some("Quiz has no questions"));

        flow.select(QuestionId::new(1), ChoiceId::new(11)).unwrap();
        assert_eq!(flow.phase(), &QuizPhase::Ready);

        flow.phase = QuizPhase::Failed("again".into());
        flow.dismiss_error();
        assert_eq!(flow.phase(), &QuizPhase::Ready);
        assert_eq!(flow.error_message(), None);
    }

    #[test]
    fn retake_clears_answers_and_restarts_timer() {
        let mut flow = QuizFlow::from_quiz(quiz(1), fixed_clock());
        flow.select(QuestionId::new(1), ChoiceId::new(11)).unwrap();
        flow.clock_mut().advance(Duration::minutes(4));
        assert_eq!(flow.time_remaining(), Some(Duration::minutes(6)));

        flow.phase = QuizPhase::Scored(QuizResult {
            attempt_id: None,
            score: 100,
            passed: true,
            correct_count: 1,
            total_questions: 1,
            results: Vec::new(),
        });
        flow.retake().unwrap();
        assert_eq!(flow.phase(), &QuizPhase::Ready);
        assert_eq!(flow.progress(), (0, 1));
        assert_eq!(flow.time_remaining(), Some(Duration::minutes(10)));
    }

    #[test]
    fn timer_clamps_at_zero() {
        let mut flow = QuizFlow::from_quiz(quiz(1), fixed_clock());
        flow.clock_mut().advance(Duration::minutes(45));
        assert_eq!(flow.time_remaining(), Some(Duration::zero()));
        assert!(flow.is_time_up());
    }

    #[test]
    fn submit_failure_message_is_normalized() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: Some(serde_json::json!({"detail": "Quiz closed"})),
        };
        assert_eq!(normalize_submit_error(err.body(), SUBMIT_FAILED), "Quiz closed");
    }
}
