use pycoder_core::model::{CourseId, Pdf, PdfId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfRowVm {
    pub id: PdfId,
    pub title: String,
    pub description: Option<String>,
    pub course: Option<CourseId>,
    pub course_title: Option<String>,
    pub href: String,
}

impl From<&Pdf> for PdfRowVm {
    fn from(pdf: &Pdf) -> Self {
        Self {
            id: pdf.id,
            title: pdf.title.clone(),
            description: non_empty(&pdf.description),
            course: pdf.course,
            course_title: pdf.course_title.as_deref().and_then(non_empty),
            href: pdf.href(),
        }
    }
}

#[must_use]
pub fn map_pdf_rows(pdfs: &[Pdf]) -> Vec<PdfRowVm> {
    pdfs.iter().map(PdfRowVm::from).collect()
}

/// Rows for one course, or all rows when `course` is `None`, with the
/// message to show if nothing matches.
#[must_use]
pub fn filter_pdf_rows(
    rows: &[PdfRowVm],
    course: Option<CourseId>,
) -> (Vec<PdfRowVm>, Option<&'static str>) {
    let filtered: Vec<PdfRowVm> = rows
        .iter()
        .filter(|row| course.is_none() || row.course == course)
        .cloned()
        .collect();
    let empty = match (filtered.is_empty(), course) {
        (false, _) => None,
        (true, None) => Some("No PDFs available yet."),
        (true, Some(_)) => Some("No PDFs found for this filter."),
    };
    (filtered, empty)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
