//! Mock hosted backend for testing
//!
//! A wiremock server answering the REST and auth endpoints the
//! `RestBackend` calls.

use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use SsaDashboard::backend::RestBackend;
use SsaDashboard::config::Settings;

pub const ANON_KEY: &str = "test-anon-key";

pub struct BackendMockServer {
    pub server: MockServer,
}

impl BackendMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// A `RestBackend` pointed at this server
    pub fn backend(&self) -> RestBackend {
        let mut settings = Settings::default();
        settings.backend.url = self.uri();
        settings.backend.anon_key = ANON_KEY.to_string();
        RestBackend::new(&settings.backend).unwrap()
    }

    pub async fn mock_user(&self, token: &str, user_id: Uuid) {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": user_id,
                "email": "member@example.com",
                "aud": "authenticated",
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_select(&self, table: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .and(header("apikey", ANON_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .expect(1..)
            .mount(&self.server)
            .await;
    }

    /// Any write to `table` answers `status`
    pub async fn mock_write(&self, verb: &str, table: &str, status: u16, body: Option<Value>) {
        let mut response = ResponseTemplate::new(status);
        if let Some(body) = body {
            response = response.set_body_json(body);
        }
        Mock::given(method(verb))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_token_exchange(&self, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "pkce"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "refresh_token": "refresh",
                "expires_in": 3600,
                "token_type": "bearer",
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
