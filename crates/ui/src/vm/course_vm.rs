use pycoder_core::model::{Course, CourseDetail, CourseId};

use crate::routes::Route;
use crate::vm::pdf_vm::{PdfRowVm, map_pdf_rows};
use crate::vm::quiz_vm::{QuizCardVm, map_quiz_cards, quiz_count_label};

/// Card shown in course grids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub level: String,
    pub duration: String,
    /// `📄 2`, hidden when the course has no PDFs.
    pub pdf_badge: Option<String>,
    /// `📝 1`, hidden when the course has no quizzes.
    pub quiz_badge: Option<String>,
    pub route: Route,
}

impl From<&Course> for CourseCardVm {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            icon: course.icon_or_default().to_owned(),
            level: course.level.label().to_owned(),
            duration: format!("⏱️ {}", course.duration),
            pdf_badge: (course.pdf_count > 0).then(|| format!("📄 {}", course.pdf_count)),
            quiz_badge: (course.quiz_count > 0).then(|| format!("📝 {}", course.quiz_count)),
            route: Route::CourseDetail {
                slug: course.slug.clone(),
            },
        }
    }
}

#[must_use]
pub fn map_course_cards(courses: &[Course]) -> Vec<CourseCardVm> {
    courses.iter().map(CourseCardVm::from).collect()
}

/// Course page with its materials and quizzes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseDetailVm {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub level: String,
    pub duration: String,
    pub pdfs: Vec<PdfRowVm>,
    pub quizzes: Vec<QuizCardVm>,
    /// `2 Quizzes Available`, absent when there are none.
    pub quiz_count_label: Option<String>,
    /// Shown when the course has neither PDFs nor quizzes.
    pub empty_message: Option<&'static str>,
}

impl From<&CourseDetail> for CourseDetailVm {
    fn from(course: &CourseDetail) -> Self {
        let pdfs = map_pdf_rows(&course.pdfs);
        let quizzes = map_quiz_cards(&course.quizzes);
        let empty_message = (pdfs.is_empty() && quizzes.is_empty())
            .then_some("No materials or quizzes available for this course yet.");
        Self {
            title: course.title.clone(),
            description: course.description.clone(),
            icon: course.icon_or_default().to_owned(),
            level: course.level.label().to_owned(),
            duration: format!("⏱️ {}", course.duration),
            quiz_count_label: quiz_count_label(quizzes.len()),
            pdfs,
            quizzes,
            empty_message,
        }
    }
}
