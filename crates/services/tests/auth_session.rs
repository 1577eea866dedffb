mod common;

use std::sync::Arc;

use serde_json::{Value, json};
use services::{
    AppServices, AuthError, AuthOutcome, NoRedirect, SignupForm, SignupValidationError,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{signed_in, signed_out};

fn user_json() -> Value {
    json!({
        "id": 5,
        "email": "ada@example.com",
        "username": "ada",
        "first_name": "Ada",
        "last_name": "Lovelace"
    })
}

fn auth_payload() -> Value {
    json!({
        "user": user_json(),
        "tokens": { "access": "access-1", "refresh": "refresh-1" },
        "message": "Login successful"
    })
}

fn signup_form() -> SignupForm {
    SignupForm {
        email: "ada@example.com".into(),
        username: "ada".into(),
        password: "correct horse".into(),
        password2: "correct horse".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
    }
}

#[tokio::test]
async fn login_stores_tokens_and_sets_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_out(&server);
    let session = harness.services.session();
    let outcome = session.login("ada@example.com", "pw").await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(session.current_user().unwrap().username, "ada");
    assert!(session.is_authenticated());
    assert!(!session.is_loading());
    assert_eq!(
        harness.stored().await,
        (Some("access-1".to_string()), Some("refresh-1".to_string()))
    );
}

#[tokio::test]
async fn login_rejection_is_normalized_and_keeps_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": { "non_field_errors": "Invalid email or password." },
            "message": "Login failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_out(&server);
    let session = harness.services.session();
    let outcome = session.login("ada@example.com", "nope").await.unwrap();

    assert_eq!(
        outcome,
        AuthOutcome::Rejected {
            message: "Non field_errors: Invalid email or password.".to_string()
        }
    );
    assert!(!session.is_authenticated());
    assert_eq!(harness.stored().await, (None, None));
}

#[tokio::test]
async fn signup_field_errors_are_labelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": { "email": "already taken" },
            "message": "Validation failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_out(&server);
    let outcome = harness
        .services
        .session()
        .signup(&signup_form())
        .await
        .unwrap();

    let message = outcome.error_message().unwrap();
    assert!(message.contains("Email: already taken"), "{message}");
}

#[tokio::test]
async fn signup_sends_the_full_form_and_signs_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "username": "ada",
            "password": "correct horse",
            "password2": "correct horse",
            "first_name": "Ada",
            "last_name": "Lovelace"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_out(&server);
    let session = harness.services.session();
    let outcome = session.signup(&signup_form()).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(
        session.current_user().map(|user| user.display_name()),
        Some("Ada Lovelace".to_string())
    );
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let harness = signed_out(&server);
    let mut form = signup_form();
    form.password2 = "different".into();

    let err = harness.services.session().signup(&form).await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::Validation(SignupValidationError::PasswordMismatch)
    ));
}

#[tokio::test]
async fn network_failures_propagate_from_login() {
    let config = services::ApiConfig::new("http://127.0.0.1:9/api/").unwrap();
    let services =
        AppServices::in_memory(config, Arc::new(NoRedirect), pycoder_core::Clock::system())
            .unwrap();

    let err = services
        .session()
        .login("ada@example.com", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Api(ref api) if api.is_network()));
}

#[tokio::test]
async fn logout_clears_tokens_and_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let harness = signed_in(&server, "access-1", "refresh-1");
    let session = harness.services.session();
    session.restore().await.unwrap();
    assert!(session.is_authenticated());

    session.logout().await.unwrap();
    assert_eq!(harness.stored().await, (None, None));
    assert_eq!(session.current_user(), None);

    session.logout().await.unwrap();
    assert_eq!(session.current_user(), None);
}

#[tokio::test]
async fn restore_without_tokens_settles_signed_out() {
    let server = MockServer::start().await;
    let harness = signed_out(&server);
    let session = harness.services.session();
    assert!(session.is_loading());

    assert_eq!(session.restore().await.unwrap(), None);
    assert!(!session.is_loading());
    assert!(!session.is_authenticated());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn restore_with_only_a_refresh_token_refreshes_silently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_out(&server);
    storage::TokenStore::save_refresh_token(&harness.tokens, "refresh-1")
        .await
        .unwrap();

    let user = harness.services.session().restore().await.unwrap();
    assert_eq!(user.map(|user| user.email), Some("ada@example.com".to_string()));
    assert_eq!(harness.stored().await.0.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn failed_user_fetch_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "access-1", "refresh-1");
    let session = harness.services.session();

    assert_eq!(session.restore().await.unwrap(), None);
    assert!(!session.is_loading());
    assert!(!session.is_authenticated());
    assert_eq!(harness.stored().await, (None, None));
}
