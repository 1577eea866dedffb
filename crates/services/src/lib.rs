#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_session;
pub mod catalog_service;
pub mod client;
pub mod config;
pub mod error;
pub mod quiz_flow;
pub mod quiz_service;
pub mod redirect;

pub use pycoder_core::Clock;

pub use app_services::AppServices;
pub use auth_session::{AuthOutcome, AuthSession, SessionSnapshot, SignupForm};
pub use catalog_service::{CatalogService, Dashboard};
pub use client::{ApiClient, ApiResponse, MAX_AUTH_RETRIES, RequestSpec};
pub use config::ApiConfig;
pub use error::{
    ApiError, AppServicesError, AuthError, ConfigError, QuizFlowError, SignupValidationError,
};
pub use quiz_flow::{QuizFlow, QuizPhase};
pub use quiz_service::QuizService;
pub use redirect::{LOGIN_ROUTE, LoginRedirect, NoRedirect, RedirectRecorder};
