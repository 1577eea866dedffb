use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CourseId, PdfId, QuizSummary};

const DEFAULT_ICON: &str = "📚";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
    /// A level this client does not know, kept as sent.
    Other(String),
}

impl CourseLevel {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            CourseLevel::Beginner => "Beginner",
            CourseLevel::Intermediate => "Intermediate",
            CourseLevel::Advanced => "Advanced",
            CourseLevel::Other(raw) => raw,
        }
    }
}

impl Default for CourseLevel {
    fn default() -> Self {
        Self::Beginner
    }
}

impl From<String> for CourseLevel {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Other(raw),
        }
    }
}

impl From<CourseLevel> for String {
    fn from(level: CourseLevel) -> Self {
        match level {
            CourseLevel::Beginner => "beginner".to_owned(),
            CourseLevel::Intermediate => "intermediate".to_owned(),
            CourseLevel::Advanced => "advanced".to_owned(),
            CourseLevel::Other(raw) => raw,
        }
    }
}

/// Catalog entry from `GET courses/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub pdf_count: u32,
    #[serde(default)]
    pub quiz_count: u32,
    #[serde(default, deserialize_with = "crate::model::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Emoji icon, falling back to the catalog default when unset.
    #[must_use]
    pub fn icon_or_default(&self) -> &str {
        icon_or_default(&self.icon)
    }
}

/// Full course from `GET courses/{slug}/`, including its resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub pdfs: Vec<Pdf>,
    #[serde(default)]
    pub quizzes: Vec<QuizSummary>,
    #[serde(default, deserialize_with = "crate::model::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CourseDetail {
    #[must_use]
    pub fn icon_or_default(&self) -> &str {
        icon_or_default(&self.icon)
    }
}

/// Downloadable PDF resource from `GET pdfs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pdf {
    pub id: PdfId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub filename: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub course: Option<CourseId>,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default, deserialize_with = "crate::model::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Pdf {
    /// Site-relative link to the static file.
    #[must_use]
    pub fn href(&self) -> String {
        let target = if self.file_path.trim().is_empty() {
            self.filename.as_str()
        } else {
            self.file_path.as_str()
        };
        format!("/pdfs/{}", target.trim_start_matches('/'))
    }
}

fn icon_or_default(icon: &str) -> &str {
    if icon.trim().is_empty() {
        DEFAULT_ICON
    } else {
        icon
    }
}
