use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use services::{
    ApiConfig, AppServices, AuthSession, CatalogService, Clock, QuizService, RedirectRecorder,
};
use ui::{UiApp, build_app_context};

mod cli;
mod commands;

use cli::{Cli, default_db_url, normalize_sqlite_url, prepare_sqlite_file};
use commands::Runner;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("Please log in first. Run `pycoder login`.")]
    NotLoggedIn,
    #[error("Session expired. Run `pycoder login`.")]
    SessionExpired,
    #[error("{0}")]
    Rejected(String),
    #[error("invalid answer {raw:?}: {reason}")]
    InvalidAnswer { raw: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

struct CliApp {
    services: AppServices,
}

impl UiApp for CliApp {
    fn clock(&self) -> Clock {
        self.services.clock()
    }

    fn session(&self) -> Arc<AuthSession> {
        self.services.session()
    }

    fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog()
    }

    fn quizzes(&self) -> Arc<QuizService> {
        self.services.quizzes()
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn api_config(cli: &Cli) -> anyhow::Result<ApiConfig> {
    let config = ApiConfig::new(&cli.api_base_url)?
        .with_refresh_path(cli.refresh_path.clone())
        .with_timeout(cli.timeout_secs.map(Duration::from_secs));
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = api_config(&cli)?;
    let db_url = cli
        .db_url
        .as_deref()
        .map_or_else(default_db_url, normalize_sqlite_url);

    // Credentials live in SQLite; keep file creation in the binary so services stay portable.
    prepare_sqlite_file(&db_url)?;
    let redirect = RedirectRecorder::new();
    let services =
        AppServices::new_sqlite(config, &db_url, Arc::new(redirect.clone()), Clock::system())
            .await
            .with_context(|| format!("failed to open credentials database {db_url}"))?;
    debug!(%db_url, base_url = %services.client().config().base_url(), "services ready");

    let app: Arc<dyn UiApp> = Arc::new(CliApp { services });
    let ctx = build_app_context(&app);

    ctx.session().restore().await?;
    let expired_on_start = redirect.take();

    let runner = Runner::new(ctx);
    let outcome = runner.run(cli.command.clone()).await;

    let expired_now = redirect.take() && !cli.command.manages_credentials();
    let expired_before = expired_on_start && !cli.command.manages_credentials() && outcome.is_err();
    if expired_now || expired_before {
        return Err(CliError::SessionExpired.into());
    }
    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
