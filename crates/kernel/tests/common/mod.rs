#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Each test builds its own [`TestApp`] over in-memory backends, driving the
//! real kernel router. Queued background tasks only run when a test calls
//! [`TestApp::drain_tasks`].

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use conclave_kernel::services::email::Mailer;
use conclave_kernel::state::AppState;
use conclave_test_utils::{TEST_CRON_KEY, TEST_JWT_SECRET, bearer};

/// A sent message.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Test application wrapper using the real kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::in_memory(TEST_JWT_SECRET, TEST_CRON_KEY, mailer.clone());
        let router = conclave_kernel::app(state.clone());

        Self {
            router,
            state,
            mailer,
        }
    }

    /// Send a request, returning the status and the JSON body (`Null` when
    /// the body is empty or not JSON).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        user: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(email) = user {
            builder = builder.header(header::AUTHORIZATION, bearer(email));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
        (status, json)
    }

    /// Send a request and return the raw body text.
    pub async fn request_text(&self, method: Method, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get(&self, path: &str, user: Option<&str>) -> (StatusCode, JsonValue) {
        self.request(Method::GET, path, user, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        user: Option<&str>,
        body: JsonValue,
    ) -> (StatusCode, JsonValue) {
        self.request(Method::POST, path, user, Some(body)).await
    }

    /// POST with no body.
    pub async fn post_empty(&self, path: &str, user: Option<&str>) -> (StatusCode, JsonValue) {
        self.request(Method::POST, path, user, None).await
    }

    /// Create a conference as `organizer`, returning its websafe key.
    pub async fn create_conference(&self, organizer: &str, body: JsonValue) -> String {
        let (status, json) = self.post("/api/conference", Some(organizer), body).await;
        assert_eq!(status, StatusCode::OK, "create conference failed: {json}");
        json["websafeKey"].as_str().unwrap().to_string()
    }

    /// Create a speaker, returning its websafe key.
    pub async fn create_speaker(&self, creator: &str, name: &str) -> String {
        let (status, json) = self
            .post(
                "/api/speaker",
                Some(creator),
                serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create speaker failed: {json}");
        json["websafeKey"].as_str().unwrap().to_string()
    }

    /// Add a session to a conference, returning its websafe key.
    pub async fn create_session(
        &self,
        organizer: &str,
        conference: &str,
        body: JsonValue,
    ) -> String {
        let (status, json) = self
            .post(
                &format!("/api/conference/{conference}/addsession"),
                Some(organizer),
                body,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create session failed: {json}");
        json["websafeKey"].as_str().unwrap().to_string()
    }

    /// Run every queued background task.
    pub async fn drain_tasks(&self) -> usize {
        self.state.task_worker().drain().await.unwrap()
    }

    /// Names in an `items` response, in order.
    pub fn names(json: &JsonValue) -> Vec<String> {
        json["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
