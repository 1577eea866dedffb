use pycoder_core::model::{QuestionResult, QuizResult};

/// One reviewed question in the results panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub mark: &'static str,
    pub question: String,
    pub your_answer: String,
    /// Only shown for wrong answers.
    pub correct_answer: Option<String>,
    pub is_correct: bool,
}

impl From<&QuestionResult> for ReviewRowVm {
    fn from(result: &QuestionResult) -> Self {
        Self {
            mark: if result.is_correct { "✅" } else { "❌" },
            question: result.question_text.clone(),
            your_answer: result
                .user_answer
                .clone()
                .filter(|answer| !answer.is_empty())
                .unwrap_or_else(|| "Not answered".to_owned()),
            correct_answer: if result.is_correct {
                None
            } else {
                result.correct_answer.clone()
            },
            is_correct: result.is_correct,
        }
    }
}

/// Results panel after a quiz is scored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizResultVm {
    pub passed: bool,
    pub headline: String,
    pub summary: String,
    pub tally: String,
    pub passing_score: String,
    pub review: Vec<ReviewRowVm>,
}

impl QuizResultVm {
    /// `passing_score` comes from the quiz; `None` shows the default 70%.
    #[must_use]
    pub fn new(result: &QuizResult, passing_score: Option<u32>) -> Self {
        let (headline, summary) = if result.passed {
            (
                "🎉 Congratulations! 🏆",
                format!("You scored {}% and passed the quiz!", result.score),
            )
        } else {
            (
                "😅 Better luck next time!",
                format!("You scored {}%. Keep practicing! 💪", result.score),
            )
        };
        Self {
            passed: result.passed,
            headline: headline.to_owned(),
            summary,
            tally: format!("{} / {} Correct", result.correct_count, result.total_questions),
            passing_score: format!(
                "Passing score: {}%",
                passing_score.filter(|score| *score > 0).unwrap_or(70)
            ),
            review: result.results.iter().map(ReviewRowVm::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(passed: bool) -> QuizResult {
        QuizResult {
            attempt_id: None,
            score: if passed { 80 } else { 40 },
            passed,
            correct_count: if passed { 4 } else { 2 },
            total_questions: 5,
            results: vec![
                QuestionResult {
                    question_id: None,
                    question_text: "What is 2 + 2?".into(),
                    user_answer: Some("4".into()),
                    correct_answer: Some("4".into()),
                    is_correct: true,
                },
                QuestionResult {
                    question_id: None,
                    question_text: "Is Python compiled?".into(),
                    user_answer: None,
                    correct_answer: Some("Both".into()),
                    is_correct: false,
                },
            ],
        }
    }

    #[test]
    fn passed_result_reads_as_a_pass() {
        let vm = QuizResultVm::new(&result(true), Some(60));
        assert_eq!(vm.summary, "You scored 80% and passed the quiz!");
        assert_eq!(vm.tally, "4 / 5 Correct");
        assert_eq!(vm.passing_score, "Passing score: 60%");
    }

    #[test]
    fn failed_result_encourages_and_defaults_threshold() {
        let vm = QuizResultVm::new(&result(false), None);
        assert_eq!(vm.summary, "You scored 40%. Keep practicing! 💪");
        assert_eq!(vm.passing_score, "Passing score: 70%");
    }

    #[test]
    fn review_rows_mark_missing_answers() {
        let vm = QuizResultVm::new(&result(true), None);
        assert_eq!(vm.review[0].correct_answer, None);
        assert_eq!(vm.review[1].mark, "❌");
        assert_eq!(vm.review[1].your_answer, "Not answered");
        assert_eq!(vm.review[1].correct_answer.as_deref(), Some("Both"));
    }
}
