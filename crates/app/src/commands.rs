use std::io::{self, BufRead, Write};

use anyhow::{Context, anyhow};
use tracing::info;

use pycoder_core::model::{ChoiceId, QuestionId, QuizAttempt, QuizId, User};
use services::{ApiError, AuthOutcome, QuizFlow, QuizFlowError, SignupForm};
use ui::views::ViewError;
use ui::vm::{
    CourseCardVm, CourseDetailVm, DashboardVm, PdfRowVm, QuestionVm, QuizCardVm, QuizFormVm,
    QuizResultVm, filter_pdf_rows, format_date, map_course_cards, map_pdf_rows, map_quiz_cards,
};
use ui::{AppContext, Route, RouteDecision};

use crate::CliError;
use crate::cli::Command;

/// Executes one subcommand against the shared app context.
pub struct Runner {
    ctx: AppContext,
}

impl Runner {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        let mut out = io::stdout();
        match command {
            Command::Login { email, password } => self.login(&mut out, &email, password).await,
            Command::Signup {
                email,
                username,
                first_name,
                last_name,
                password,
                password2,
            } => {
                let form = signup_form(email, username, first_name, last_name, password, password2)?;
                self.signup(&mut out, &form).await
            }
            Command::Logout => {
                self.ctx.session().logout().await?;
                writeln!(out, "Logged out.")?;
                Ok(())
            }
            Command::Whoami => {
                self.guard(Route::Dashboard)?;
                let user = self.ctx.session().current_user().ok_or(CliError::NotLoggedIn)?;
                render_user(&mut out, &user)?;
                Ok(())
            }
            Command::Dashboard => {
                self.guard(Route::Dashboard)?;
                let dashboard = self.ctx.catalog().dashboard().await;
                let user = self.ctx.session().current_user();
                let vm = DashboardVm::new(user.as_ref(), dashboard);
                render_dashboard(&mut out, &vm)?;
                Ok(())
            }
            Command::Courses => {
                self.guard(Route::Courses)?;
                let courses = self.ctx.catalog().courses().await.map_err(view_error)?;
                render_course_cards(&mut out, &map_course_cards(&courses))?;
                Ok(())
            }
            Command::Course { slug } => {
                self.guard(Route::CourseDetail { slug: slug.clone() })?;
                let detail = self.ctx.catalog().course(&slug).await.map_err(view_error)?;
                render_course_detail(&mut out, &CourseDetailVm::from(&detail))?;
                Ok(())
            }
            Command::Pdfs { course } => {
                self.guard(Route::Pdfs)?;
                let pdfs = self.ctx.catalog().pdfs(course).await.map_err(view_error)?;
                let (rows, empty) = filter_pdf_rows(&map_pdf_rows(&pdfs), course);
                render_pdf_rows(&mut out, &rows, empty)?;
                Ok(())
            }
            Command::Quizzes { course } => {
                self.guard(Route::Dashboard)?;
                let quizzes = self.ctx.catalog().quizzes(course).await.map_err(view_error)?;
                render_quiz_cards(&mut out, &map_quiz_cards(&quizzes))?;
                Ok(())
            }
            Command::Attempts => {
                self.guard(Route::Dashboard)?;
                let attempts = self.ctx.catalog().attempts().await.map_err(view_error)?;
                render_attempts(&mut out, &attempts)?;
                Ok(())
            }
            Command::Quiz { id, answers } => {
                self.guard(Route::Quiz { id })?;
                self.take_quiz(id, &answers).await
            }
        }
    }

    /// Protected commands need a signed-in session.
    fn guard(&self, route: Route) -> Result<(), CliError> {
        match self.ctx.navigate(route) {
            RouteDecision::Render(_) => Ok(()),
            RouteDecision::Redirect(Route::Login) | RouteDecision::Loading => {
                Err(CliError::NotLoggedIn)
            }
            RouteDecision::Redirect(_) => Ok(()),
        }
    }

    async fn login(
        &self,
        out: &mut impl Write,
        email: &str,
        password: Option<String>,
    ) -> anyhow::Result<()> {
        if let RouteDecision::Redirect(_) = self.ctx.navigate(Route::Login) {
            return already_signed_in(out, self.ctx.session().current_user());
        }
        let password = match password {
            Some(password) => password,
            None => prompt("Password: ")?,
        };
        let outcome = self.ctx.session().login(email, &password).await?;
        report_outcome(out, outcome, "Logged in")
    }

    async fn signup(&self, out: &mut impl Write, form: &SignupForm) -> anyhow::Result<()> {
        if let RouteDecision::Redirect(_) = self.ctx.navigate(Route::Signup) {
            return already_signed_in(out, self.ctx.session().current_user());
        }
        let outcome = self.ctx.session().signup(form).await?;
        report_outcome(out, outcome, "Account created. Logged in")
    }

    async fn take_quiz(&self, id: QuizId, answers: &[(QuestionId, ChoiceId)]) -> anyhow::Result<()> {
        let catalog = self.ctx.catalog();
        let mut flow = self.ctx.quiz_flow(id);
        flow.load(&catalog)
            .await
            .map_err(|err| flow_error(err, &flow))?;

        let form = QuizFormVm::from_flow(&flow).context("quiz did not load")?;
        let mut out = io::stdout();
        render_quiz_header(&mut out, &form)?;

        if answers.is_empty() {
            let mut input = io::stdin().lock();
            for question in &form.questions {
                render_question(&mut out, question)?;
                out.flush()?;
                if let Some(index) = read_choice(&mut input, question.choices.len())? {
                    flow.select(question.id, question.choices[index].id)?;
                }
            }
        } else {
            for &(question, choice) in answers {
                flow.select(question, choice)?;
            }
        }

        render_time_notice(&mut out, &flow)?;
        let quizzes = self.ctx.quizzes();
        let result = flow
            .submit(&quizzes)
            .await
            .map_err(|err| flow_error(err, &flow))?;
        info!(quiz_id = %id, score = result.score, "quiz submitted");

        let passing = flow.quiz().map(|quiz| quiz.passing_score);
        render_result(&mut out, &QuizResultVm::new(&result, passing))?;
        Ok(())
    }
}

fn signup_form(
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password: Option<String>,
    password2: Option<String>,
) -> io::Result<SignupForm> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };
    let password2 = match password2 {
        Some(password2) => password2,
        None => prompt("Confirm password: ")?,
    };
    Ok(SignupForm {
        email,
        username,
        password,
        password2,
        first_name,
        last_name,
    })
}

fn report_outcome(out: &mut impl Write, outcome: AuthOutcome, verb: &str) -> anyhow::Result<()> {
    match outcome {
        AuthOutcome::Authenticated(user) => {
            writeln!(out, "{verb} as {}.", user.email)?;
            Ok(())
        }
        AuthOutcome::Rejected { message } => Err(CliError::Rejected(message).into()),
    }
}

fn already_signed_in(out: &mut impl Write, user: Option<User>) -> anyhow::Result<()> {
    let who = user.map_or_else(|| "someone".to_owned(), |user| user.email);
    writeln!(out, "Already logged in as {who}. Run `pycoder logout` first.")?;
    Ok(())
}

fn view_error(err: ApiError) -> anyhow::Error {
    let message = ViewError::from(&err).message().to_owned();
    anyhow::Error::new(err).context(message)
}

fn flow_error(err: QuizFlowError, flow: &QuizFlow) -> anyhow::Error {
    match err {
        QuizFlowError::Load(source) => view_error(source).context(
            flow.error_message()
                .unwrap_or("Failed to load quiz")
                .to_owned(),
        ),
        QuizFlowError::Submit { message, .. } => anyhow!(message),
        other => other.into(),
    }
}

fn prompt(label: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Read a 1-based choice number. Blank input skips the question.
fn read_choice(input: &mut impl BufRead, count: usize) -> Result<Option<usize>, CliError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let raw = line.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let invalid = |reason: String| CliError::InvalidAnswer {
        raw: raw.to_owned(),
        reason,
    };
    let number: usize = raw
        .parse()
        .map_err(|_| invalid("expected a choice number".into()))?;
    if number == 0 || number > count {
        return Err(invalid(format!("pick a number from 1 to {count}")));
    }
    Ok(Some(number - 1))
}

fn render_user(out: &mut impl Write, user: &User) -> io::Result<()> {
    writeln!(out, "{} <{}>", user.display_name(), user.email)?;
    if !user.username.is_empty() {
        writeln!(out, "Username: {}", user.username)?;
    }
    Ok(())
}

fn render_dashboard(out: &mut impl Write, vm: &DashboardVm) -> io::Result<()> {
    writeln!(out, "{}", vm.greeting)?;
    writeln!(out)?;
    writeln!(out, "📚 Courses")?;
    render_course_cards(out, vm.course_cards())?;
    writeln!(out)?;
    writeln!(out, "📝 Quizzes")?;
    render_quiz_cards(out, vm.quiz_cards())?;
    for err in vm.errors() {
        writeln!(out, "⚠️ {}", err.message())?;
    }
    Ok(())
}

fn render_course_cards(out: &mut impl Write, cards: &[CourseCardVm]) -> io::Result<()> {
    if cards.is_empty() {
        return writeln!(out, "  No courses yet. Check back soon!");
    }
    for card in cards {
        let badges: Vec<&str> = [card.pdf_badge.as_deref(), card.quiz_badge.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        writeln!(out, "  {} {}  [{}]", card.icon, card.title, card.level)?;
        writeln!(out, "     {} {}  {}", card.duration, badges.join(" "), card.route)?;
    }
    Ok(())
}

fn render_course_detail(out: &mut impl Write, vm: &CourseDetailVm) -> io::Result<()> {
    writeln!(out, "{} {}", vm.icon, vm.title)?;
    writeln!(out, "{} · {}", vm.level, vm.duration)?;
    if !vm.description.trim().is_empty() {
        writeln!(out, "{}", vm.description.trim())?;
    }
    if let Some(empty) = vm.empty_message {
        return writeln!(out, "{empty}");
    }
    if !vm.pdfs.is_empty() {
        writeln!(out)?;
        writeln!(out, "📄 Study Materials")?;
        render_pdf_rows(out, &vm.pdfs, None)?;
    }
    if let Some(label) = &vm.quiz_count_label {
        writeln!(out)?;
        writeln!(out, "📝 {label}")?;
        render_quiz_cards(out, &vm.quizzes)?;
    }
    Ok(())
}

fn render_pdf_rows(
    out: &mut impl Write,
    rows: &[PdfRowVm],
    empty: Option<&'static str>,
) -> io::Result<()> {
    if let Some(empty) = empty {
        return writeln!(out, "  {empty}");
    }
    for row in rows {
        match &row.course_title {
            Some(course) => writeln!(out, "  {} ({course})", row.title)?,
            None => writeln!(out, "  {}", row.title)?,
        }
        writeln!(out, "     {}", row.href)?;
    }
    Ok(())
}

fn render_quiz_cards(out: &mut impl Write, cards: &[QuizCardVm]) -> io::Result<()> {
    if cards.is_empty() {
        return writeln!(out, "  No quizzes available yet.");
    }
    for card in cards {
        write!(out, "  #{} {}", card.id, card.title)?;
        if let Some(course) = &card.course_title {
            write!(out, " ({course})")?;
        }
        writeln!(out)?;
        writeln!(out, "     {}", card.stats)?;
    }
    Ok(())
}

fn render_attempts(out: &mut impl Write, attempts: &[QuizAttempt]) -> io::Result<()> {
    if attempts.is_empty() {
        return writeln!(out, "No quiz attempts yet.");
    }
    for attempt in attempts {
        writeln!(
            out,
            "{}  {}  {}% of {} questions",
            format_date(attempt.completed_at),
            attempt.quiz_title,
            attempt.score,
            attempt.total_questions
        )?;
    }
    Ok(())
}

fn render_quiz_header(out: &mut impl Write, form: &QuizFormVm) -> io::Result<()> {
    let header = &form.header;
    writeln!(out, "{}", header.title)?;
    if let Some(description) = &header.description {
        writeln!(out, "{description}")?;
    }
    writeln!(
        out,
        "{} · {} · {}",
        header.time_limit, header.passing_score, header.question_count
    )?;
    if let Some(countdown) = &form.countdown {
        writeln!(out, "Time left: {countdown}")?;
    }
    Ok(())
}

fn render_question(out: &mut impl Write, question: &QuestionVm) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", question.heading)?;
    for (index, choice) in question.choices.iter().enumerate() {
        writeln!(out, "  {}) {}", index + 1, choice.text)?;
    }
    write!(out, "> ")
}

/// The limit is not enforced by the backend, so answers are still sent.
fn render_time_notice(out: &mut impl Write, flow: &QuizFlow) -> io::Result<()> {
    if flow.is_time_up() {
        writeln!(out)?;
        writeln!(out, "⏰ Time's up! Submitting your answers anyway.")?;
    }
    Ok(())
}

fn render_result(out: &mut impl Write, vm: &QuizResultVm) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", vm.headline)?;
    writeln!(out, "{}", vm.summary)?;
    writeln!(out, "{}  ({})", vm.tally, vm.passing_score)?;
    for row in &vm.review {
        writeln!(out)?;
        writeln!(out, "{} {}", row.mark, row.question)?;
        writeln!(out, "   Your answer: {}", row.your_answer)?;
        if let Some(correct) = &row.correct_answer {
            writeln!(out, "   Correct answer: {correct}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pycoder_core::model::{AttemptId, Quiz, QuestionResult, QuizResult, UserId};
    use pycoder_core::time::fixed_clock;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn read_choice_accepts_numbers_in_range() {
        let mut input = io::Cursor::new("2\n");
        assert_eq!(read_choice(&mut input, 3).unwrap(), Some(1));

        let mut blank = io::Cursor::new("\n");
        assert_eq!(read_choice(&mut blank, 3).unwrap(), None);
    }

    #[test]
    fn read_choice_rejects_out_of_range_and_text() {
        let mut zero = io::Cursor::new("0\n");
        assert!(matches!(
            read_choice(&mut zero, 3),
            Err(CliError::InvalidAnswer { .. })
        ));
        let mut high = io::Cursor::new("4\n");
        let err = read_choice(&mut high, 3).unwrap_err();
        assert_eq!(err.to_string(), "invalid answer \"4\": pick a number from 1 to 3");
        let mut text = io::Cursor::new("b\n");
        assert!(read_choice(&mut text, 3).is_err());
    }

    #[test]
    fn rejected_outcome_becomes_error_with_message() {
        let mut buf = Vec::new();
        let err = report_outcome(
            &mut buf,
            AuthOutcome::Rejected {
                message: "Email: already taken".into(),
            },
            "Logged in",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Email: already taken");
        assert!(buf.is_empty());
    }

    #[test]
    fn authenticated_outcome_names_the_user() {
        let user = User {
            id: UserId::new(1),
            email: "ada@example.com".into(),
            username: "ada".into(),
            first_name: "Ada".into(),
            last_name: String::new(),
        };
        let mut buf = Vec::new();
        report_outcome(&mut buf, AuthOutcome::Authenticated(user), "Logged in").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Logged in as ada@example.com.\n");
    }

    #[test]
    fn empty_lists_show_placeholders() {
        assert_eq!(
            rendered(|out| render_quiz_cards(out, &[])),
            "  No quizzes available yet.\n"
        );
        assert_eq!(
            rendered(|out| render_pdf_rows(out, &[], Some("No PDFs available yet."))),
            "  No PDFs available yet.\n"
        );
        assert_eq!(rendered(|out| render_attempts(out, &[])), "No quiz attempts yet.\n");
    }

    #[test]
    fn attempts_show_date_title_and_score() {
        let attempt = QuizAttempt {
            id: AttemptId::new(3),
            quiz: QuizId::new(4),
            quiz_title: "Loops".into(),
            score: 80,
            total_questions: 5,
            completed_at: None,
        };
        let text = rendered(|out| render_attempts(out, &[attempt]));
        assert!(text.contains("Loops  80% of 5 questions"));
    }

    #[test]
    fn result_lists_correct_answer_only_for_misses() {
        let result = QuizResult {
            attempt_id: None,
            score: 50,
            correct_count: 1,
            total_questions: 2,
            passed: false,
            results: vec![
                QuestionResult {
                    question_id: Some(QuestionId::new(1)),
                    question_text: "2 + 2?".into(),
                    user_answer: Some("4".into()),
                    correct_answer: Some("4".into()),
                    is_correct: true,
                },
                QuestionResult {
                    question_id: Some(QuestionId::new(2)),
                    question_text: "len([])?".into(),
                    user_answer: None,
                    correct_answer: Some("0".into()),
                    is_correct: false,
                },
            ],
        };
        let text = rendered(|out| render_result(out, &QuizResultVm::new(&result, Some(70))));
        assert!(text.contains("😅 Better luck next time!"));
        assert!(text.contains("1 / 2 Correct  (Passing score: 70%)"));
        assert_eq!(text.matches("Correct answer:").count(), 1);
        assert!(text.contains("Your answer: Not answered"));
    }

    fn quiz_with_limit(minutes: u32) -> Quiz {
        Quiz {
            id: QuizId::new(4),
            title: "Loops".into(),
            description: String::new(),
            course: None,
            course_title: None,
            time_limit: minutes,
            passing_score: 70,
            questions: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn expired_limit_is_announced_before_submitting() {
        let flow = QuizFlow::from_quiz(quiz_with_limit(0), fixed_clock());
        assert!(flow.is_time_up());
        let text = rendered(|out| render_time_notice(out, &flow));
        assert!(text.contains("Time's up! Submitting your answers anyway."));
    }

    #[test]
    fn running_clock_prints_no_notice() {
        let flow = QuizFlow::from_quiz(quiz_with_limit(30), fixed_clock());
        assert_eq!(rendered(|out| render_time_notice(out, &flow)), "");
    }
}
