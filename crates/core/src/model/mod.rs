mod answers;
mod course;
mod ids;
mod quiz;
mod result;
mod timestamp;
mod tokens;
mod user;

pub use answers::{AnswerError, AnswerSheet, QuizSubmission};
pub use course::{Course, CourseDetail, CourseLevel, Pdf};
pub use ids::{AttemptId, ChoiceId, CourseId, ParseIdError, PdfId, QuestionId, QuizId, UserId};
pub use quiz::{Choice, Question, Quiz, QuizSummary};
pub use result::{QuestionResult, QuizAttempt, QuizResult};
pub use tokens::{RefreshedTokens, TokenPair};
pub use user::User;
