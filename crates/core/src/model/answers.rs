use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::{ChoiceId, QuestionId, Quiz, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("choice {choice} does not belong to question {question}")]
    UnknownChoice {
        question: QuestionId,
        choice: ChoiceId,
    },

    #[error("Please answer all {expected} questions before submitting.")]
    Incomplete { expected: usize, answered: usize },
}

/// In-progress answers for one quiz attempt: at most one choice per question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: BTreeMap<QuestionId, ChoiceId>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `choice` for `question`, replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::UnknownQuestion` or `AnswerError::UnknownChoice`
    /// when the ids do not belong to `quiz`.
    pub fn select(
        &mut self,
        quiz: &Quiz,
        question: QuestionId,
        choice: ChoiceId,
    ) -> Result<(), AnswerError> {
        let found = quiz
            .question(question)
            .ok_or(AnswerError::UnknownQuestion(question))?;
        if !found.has_choice(choice) {
            return Err(AnswerError::UnknownChoice { question, choice });
        }
        self.answers.insert(question, choice);
        Ok(())
    }

    #[must_use]
    pub fn selected(&self, question: QuestionId) -> Option<ChoiceId> {
        self.answers.get(&question).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self, quiz: &Quiz) -> bool {
        self.answers.len() == quiz.question_count()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, ChoiceId)> + '_ {
        self.answers.iter().map(|(q, c)| (*q, *c))
    }

    /// Build the wire payload for `POST quizzes/{id}/submit/`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Incomplete` unless every question has exactly one answer.
    pub fn to_submission(&self, quiz: &Quiz) -> Result<QuizSubmission, AnswerError> {
        if !self.is_complete(quiz) {
            return Err(AnswerError::Incomplete {
                expected: quiz.question_count(),
                answered: self.answers.len(),
            });
        }
        Ok(QuizSubmission::new(quiz.id, self.iter()))
    }
}

/// Submission body: question ids as string keys, choice ids as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSubmission {
    pub quiz_id: u64,
    pub answers: BTreeMap<String, u64>,
}

impl QuizSubmission {
    pub fn new(quiz_id: QuizId, answers: impl IntoIterator<Item = (QuestionId, ChoiceId)>) -> Self {
        Self {
            quiz_id: quiz_id.value(),
            answers: answers
                .into_iter()
                .map(|(question, choice)| (question.to_string(), choice.value()))
                .collect(),
        }
    }
}
