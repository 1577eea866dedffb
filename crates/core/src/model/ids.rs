use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a user account
    UserId
);
numeric_id!(
    /// Unique identifier for a Course
    CourseId
);
numeric_id!(
    /// Unique identifier for a PDF resource
    PdfId
);
numeric_id!(
    /// Unique identifier for a Quiz
    QuizId
);
numeric_id!(
    /// Unique identifier for a Question within a quiz
    QuestionId
);
numeric_id!(
    /// Unique identifier for a Choice within a question
    ChoiceId
);
numeric_id!(
    /// Unique identifier for a recorded quiz attempt
    AttemptId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_id_display() {
        let id = QuizId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "QuizId(42)");
    }

    #[test]
    fn test_question_id_from_str() {
        let id: QuestionId = "123".parse().unwrap();
        assert_eq!(id, QuestionId::new(123));
    }

    #[test]
    fn test_choice_id_from_str_trims_whitespace() {
        let id: ChoiceId = " 7 \n".parse().unwrap();
        assert_eq!(id, ChoiceId::new(7));
    }

    #[test]
    fn test_course_id_from_str_invalid() {
        let err = "not-a-number".parse::<CourseId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse CourseId from string");
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&QuizId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: QuizId = serde_json::from_str("5").unwrap();
        assert_eq!(back, QuizId::new(5));
    }
}
