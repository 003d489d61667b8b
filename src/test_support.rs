//! Helpers for router-level tests.

use axum::{
    body::{to_bytes, Body},
    extract::FromRef,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{app::build_app, auth::JwtKeys, state::AppState};

/// An app over a fresh in-memory store, plus a signed-in user.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub user_id: Uuid,
    token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_ref(&state)
            .sign_access(user_id)
            .expect("sign access");
        Self {
            router: build_app(state.clone()),
            state,
            user_id,
            token,
        }
    }

    /// Same store, different user.
    pub fn other_user(&self) -> Self {
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_ref(&self.state)
            .sign_access(user_id)
            .expect("sign access");
        Self {
            state: self.state.clone(),
            router: self.router.clone(),
            user_id,
            token,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let res = self.router.clone().oneshot(req).await.expect("router responds");
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    /// Registers an animal and returns its id.
    pub async fn create_animal(&self, body: Value) -> String {
        let (status, json) = self.post("/api/v1/animals", body).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().expect("animal id").to_string()
    }
}
