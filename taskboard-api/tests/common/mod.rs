//! Common test utilities for integration tests
//!
//! Builds the real router over a fresh `MemoryStore` and mints tokens with
//! the test secret, so requests go through the same authentication path as
//! production.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::store::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const TEST_ISSUER: &str = "taskboard";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: axum::Router,
    pub config: Config,
    pub user_id: String,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a context with an empty store and a token for `user-1`
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STORE_BACKEND", "memory"),
            ("AUTH_JWT_SECRET", TEST_SECRET),
            ("AUTH_ISSUER", TEST_ISSUER),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config should load");

        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), config.clone());
        let app = build_router(state);

        let user_id = "user-1".to_string();
        let jwt_token = token_for(&user_id);

        TestContext {
            store,
            app,
            config,
            user_id,
            jwt_token,
        }
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request as the default user
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_with_auth(method, uri, body, Some(&self.auth_header())).await
    }

    /// Sends a request with an explicit `Authorization` header (or none)
    pub async fn send_with_auth(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    /// Creates a project owned by the default user and returns its ID
    pub async fn create_project(&self, name: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/projects",
                Some(serde_json::json!({ "name": name, "ownerId": self.user_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a task with the given status and returns the response body
    pub async fn create_task(&self, project_id: &str, title: &str, status: &str) -> Value {
        let (code, body) = self
            .send(
                "POST",
                "/tasks",
                Some(serde_json::json!({
                    "title": title,
                    "projectId": project_id,
                    "status": status,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "create task failed: {}", body);
        body
    }
}

/// Bearer token for `user_id` signed with the test secret
pub fn token_for(user_id: &str) -> String {
    create_token(&Claims::new(user_id, TEST_ISSUER), TEST_SECRET).unwrap()
}
