use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use pycoder_core::model::{ChoiceId, CourseId, QuestionId, QuizId};
use services::config::{
    DEFAULT_API_BASE_URL, DEFAULT_REFRESH_PATH, ENV_API_BASE_URL, ENV_HTTP_TIMEOUT_SECS,
    ENV_REFRESH_PATH,
};

use crate::CliError;

pub const ENV_DB_URL: &str = "PYCODER_DB_URL";
pub const DEFAULT_DB_FILE: &str = "pycoder.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "pycoder", about = "Courses, study PDFs and quizzes from the terminal")]
pub struct Cli {
    #[arg(long, global = true, env = ENV_API_BASE_URL, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Token refresh endpoint, relative to the API base URL.
    #[arg(long, global = true, env = ENV_REFRESH_PATH, default_value = DEFAULT_REFRESH_PATH)]
    pub refresh_path: String,

    /// `SQLite` database holding the saved credentials.
    #[arg(long = "db", global = true, env = ENV_DB_URL)]
    pub db_url: Option<String>,

    #[arg(
        long,
        global = true,
        env = ENV_HTTP_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in and save the credentials.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "PYCODER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        password2: Option<String>,
    },
    /// Forget the saved credentials.
    Logout,
    Whoami,
    Dashboard,
    Courses,
    Course {
        slug: String,
    },
    Pdfs {
        #[arg(long)]
        course: Option<CourseId>,
    },
    Quizzes {
        #[arg(long)]
        course: Option<CourseId>,
    },
    /// Past quiz results.
    Attempts,
    /// Take a quiz. Prompts for each answer unless `--answer` is given.
    Quiz {
        id: QuizId,
        /// `QUESTION_ID=CHOICE_ID`, once per question.
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(QuestionId, ChoiceId)>,
    },
}

impl Command {
    /// Commands that manage credentials themselves rather than using them.
    #[must_use]
    pub fn manages_credentials(&self) -> bool {
        matches!(
            self,
            Command::Login { .. } | Command::Signup { .. } | Command::Logout
        )
    }
}

fn parse_answer(raw: &str) -> Result<(QuestionId, ChoiceId), String> {
    let (question, choice) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION_ID=CHOICE_ID, got {raw:?}"))?;
    let question = question.parse().map_err(|err| format!("{err}"))?;
    let choice = choice.parse().map_err(|err| format!("{err}"))?;
    Ok((question, choice))
}

/// Turn a path or partial URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[must_use]
pub fn default_db_url() -> String {
    normalize_sqlite_url(DEFAULT_DB_FILE)
}

/// Create the database file and its parent directories so `SQLite` can open it.
///
/// # Errors
///
/// Returns `CliError::InvalidDbUrl` for URLs without a file path, or the I/O
/// error from creating the file.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), CliError> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let invalid = || CliError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
