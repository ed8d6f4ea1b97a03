//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh in-memory store, so tests
//! are independent and need no database.
//!
//! - `TestContext`: router, store and config for one test
//! - request helpers returning status and decoded JSON
//! - account helpers (register, seed admin)

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskmate_api::app::{build_router, AppState};
use taskmate_api::config::Config;
use taskmate_shared::auth::password::hash_password;
use taskmate_shared::models::{CreateUser, Role, User};
use taskmate_shared::store::{MemoryStore, Store};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub config: Config,
    pub static_dir: PathBuf,
}

impl TestContext {
    /// Creates a context whose static directory holds a stub client
    pub fn new() -> Self {
        let static_dir = std::env::temp_dir().join(format!("taskmate-client-{}", Uuid::new_v4()));
        std::fs::create_dir_all(static_dir.join("assets")).unwrap();
        std::fs::write(
            static_dir.join("index.html"),
            "<!doctype html><title>TaskMate</title>",
        )
        .unwrap();
        std::fs::write(static_dir.join("assets/app.js"), "console.log('taskmate');").unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            ("DATABASE_URL", "memory://".to_string()),
            ("JWT_SECRET", TEST_SECRET.to_string()),
            ("STATIC_DIR", static_dir.display().to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), config.clone()));

        Self {
            app,
            store,
            config,
            static_dir,
        }
    }

    /// Sends a request and returns the status and JSON body (Null if empty)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, Some(token), None).await
    }

    /// Registers a user and returns (token, user JSON)
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (String, Value) {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let token = body["token"].as_str().unwrap().to_string();
        (token, body["user"].clone())
    }

    /// Registers a regular user with a unique email and returns its token
    pub async fn user_token(&self) -> String {
        let email = format!("user-{}@example.com", Uuid::new_v4());
        self.register("Test User", &email, "password123").await.0
    }

    /// Inserts an admin straight into the store and logs in as it
    pub async fn admin_token(&self) -> (String, User) {
        let email = format!("admin-{}@example.com", Uuid::new_v4());
        let admin = self
            .store
            .create_user(CreateUser {
                name: "Admin".to_string(),
                email: email.clone(),
                password_hash: hash_password("admin-password").unwrap(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": "admin-password" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);

        (body["token"].as_str().unwrap().to_string(), admin)
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, token: &str, title: &str, user_id: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/tasks",
                token,
                json!({ "title": title, "userId": user_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.static_dir);
    }
}
