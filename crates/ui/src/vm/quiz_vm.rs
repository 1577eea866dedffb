use pycoder_core::model::{ChoiceId, QuestionId, Quiz, QuizId, QuizSummary};
use services::{QuizFlow, QuizPhase};

use crate::routes::Route;
use crate::vm::time_fmt::format_countdown;

/// Quiz tile on the dashboard and course pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizCardVm {
    pub id: QuizId,
    pub title: String,
    pub description: Option<String>,
    pub course_title: Option<String>,
    /// `⏱️ 30 min · ✅ 70% · 📋 5 Q`; the question count is left out when zero.
    pub stats: String,
    pub route: Route,
}

impl From<&QuizSummary> for QuizCardVm {
    fn from(quiz: &QuizSummary) -> Self {
        let mut stats = vec![
            format!("⏱️ {} min", quiz.time_limit),
            format!("✅ {}%", quiz.passing_score),
        ];
        if quiz.question_count > 0 {
            stats.push(format!("📋 {} Q", quiz.question_count));
        }
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            description: Some(quiz.description.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
            course_title: quiz.course_title.clone().filter(|title| !title.is_empty()),
            stats: stats.join(" · "),
            route: Route::Quiz { id: quiz.id },
        }
    }
}

#[must_use]
pub fn map_quiz_cards(quizzes: &[QuizSummary]) -> Vec<QuizCardVm> {
    quizzes.iter().map(QuizCardVm::from).collect()
}

/// `1 Quiz Available` / `3 Quizzes Available`; `None` for zero.
#[must_use]
pub fn quiz_count_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 Quiz Available".to_owned()),
        n => Some(format!("{n} Quizzes Available")),
    }
}

/// Title block above the questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizHeaderVm {
    pub title: String,
    pub description: Option<String>,
    pub time_limit: String,
    pub passing_score: String,
    pub question_count: String,
}

impl From<&Quiz> for QuizHeaderVm {
    fn from(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title.clone(),
            description: Some(quiz.description.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
            time_limit: format!("⏱️ Time limit: {} minutes", quiz.time_limit),
            passing_score: format!("✅ Passing score: {}%", quiz.passing_score),
            question_count: format!("📝 Questions: {}", quiz.question_count()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub id: ChoiceId,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    /// `1. What does len() return?`
    pub heading: String,
    pub choices: Vec<ChoiceVm>,
}

/// The answer form for a ready quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizFormVm {
    pub header: QuizHeaderVm,
    pub questions: Vec<QuestionVm>,
    pub can_submit: bool,
    pub submit_label: &'static str,
    /// `Answered 2 of 3 questions`, shown while the sheet is partly filled.
    pub progress_hint: Option<String>,
    pub countdown: Option<String>,
    pub error: Option<String>,
}

impl QuizFormVm {
    /// Form state for `flow`, or `None` until the quiz has loaded.
    #[must_use]
    pub fn from_flow(flow: &QuizFlow) -> Option<Self> {
        let quiz = flow.quiz()?;
        let answers = flow.answers();
        let (answered, total) = flow.progress();
        let submitting = matches!(flow.phase(), QuizPhase::Submitting);

        let mut questions: Vec<&pycoder_core::model::Question> = quiz.questions.iter().collect();
        questions.sort_by_key(|question| question.order);

        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| QuestionVm {
                id: question.id,
                heading: format!("{}. {}", index + 1, question.text),
                choices: question
                    .choices
                    .iter()
                    .map(|choice| ChoiceVm {
                        id: choice.id,
                        text: choice.text.clone(),
                        selected: answers.selected(question.id) == Some(choice.id),
                    })
                    .collect(),
            })
            .collect();

        Some(Self {
            header: QuizHeaderVm::from(quiz),
            questions,
            can_submit: !submitting && answered > 0 && answered >= total,
            submit_label: if submitting {
                "⏳ Submitting..."
            } else {
                "Submit Quiz ✅"
            },
            progress_hint: (answered > 0 && answered < total)
                .then(|| format!("Answered {answered} of {total} questions")),
            countdown: flow.time_remaining().map(format_countdown),
            error: flow.error_message().map(str::to_owned),
        })
    }
}
