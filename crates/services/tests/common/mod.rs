#![allow(dead_code)]

use std::sync::Arc;

use pycoder_core::model::TokenPair;
use pycoder_core::time::fixed_clock;
use services::{ApiClient, ApiConfig, AppServices, RedirectRecorder};
use storage::repository::{InMemoryTokenStore, Storage, TokenStore};
use wiremock::MockServer;

pub struct Harness {
    pub services: AppServices,
    pub tokens: InMemoryTokenStore,
    pub redirect: RedirectRecorder,
}

impl Harness {
    pub fn client(&self) -> &ApiClient {
        self.services.client()
    }

    pub async fn stored(&self) -> (Option<String>, Option<String>) {
        (
            self.tokens.access_token().await.unwrap(),
            self.tokens.refresh_token().await.unwrap(),
        )
    }
}

pub fn config_for(server: &MockServer) -> ApiConfig {
    ApiConfig::new(&format!("{}/api/", server.uri())).unwrap()
}

pub fn harness(server: &MockServer, tokens: InMemoryTokenStore) -> Harness {
    let redirect = RedirectRecorder::new();
    let storage = Storage {
        tokens: Arc::new(tokens.clone()) as Arc<dyn TokenStore>,
    };
    let services = AppServices::new(
        config_for(server),
        &storage,
        Arc::new(redirect.clone()),
        fixed_clock(),
    )
    .unwrap();
    Harness {
        services,
        tokens,
        redirect,
    }
}

pub fn signed_in(server: &MockServer, access: &str, refresh: &str) -> Harness {
    harness(
        server,
        InMemoryTokenStore::with_tokens(&TokenPair::new(access, refresh)),
    )
}

pub fn signed_out(server: &MockServer) -> Harness {
    harness(server, InMemoryTokenStore::new())
}
