mod course_vm;
mod dashboard_vm;
mod pdf_vm;
mod quiz_vm;
mod result_vm;
mod time_fmt;

pub use course_vm::{CourseCardVm, CourseDetailVm, map_course_cards};
pub use dashboard_vm::{DASHBOARD_LIMIT, DashboardVm, welcome_name};
pub use pdf_vm::{PdfRowVm, filter_pdf_rows, map_pdf_rows};
pub use quiz_vm::{
    ChoiceVm, QuestionVm, QuizCardVm, QuizFormVm, QuizHeaderVm, map_quiz_cards, quiz_count_label,
};
pub use result_vm::{QuizResultVm, ReviewRowVm};
pub use time_fmt::{format_countdown, format_date};
