//! Conference creation, lookup and registration tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use common::TestApp;
use conclave_test_utils::test_conference;

const ORGANIZER: &str = "organizer@example.com";
const ATTENDEE: &str = "attendee@example.com";

#[tokio::test]
async fn create_requires_authorization() {
    let app = TestApp::new();
    let (status, json) = app
        .post("/api/conference", None, test_conference("RustConf").build())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Authorization required");
}

#[tokio::test]
async fn create_requires_name() {
    let app = TestApp::new();
    let (status, json) = app
        .post("/api/conference", Some(ORGANIZER), serde_json::json!({ "city": "Paris" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("'name' field required"));
}

#[tokio::test]
async fn create_applies_defaults_and_mails_organizer() {
    let app = TestApp::new();
    let (status, json) = app
        .post(
            "/api/conference",
            Some(ORGANIZER),
            test_conference("RustConf")
                .with_max_attendees(50)
                .dated("2026-09-08", "2026-09-10")
                .build(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["city"], "Default City");
    assert_eq!(json["topics"], serde_json::json!(["Default", "Topic"]));
    assert_eq!(json["month"], 9);
    assert_eq!(json["seatsAvailable"], 50);
    assert_eq!(json["organizerDisplayName"], "organizer");

    assert!(app.mailer.sent().is_empty(), "mail waits for the worker");
    assert_eq!(app.drain_tasks().await, 1);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ORGANIZER);
    assert!(sent[0].body.contains("Name: RustConf"));
    assert!(sent[0].body.contains(json["websafeKey"].as_str().unwrap()));
}

#[tokio::test]
async fn get_unknown_key_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/conference/not-a-key", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_includes_organizer_display_name() {
    let app = TestApp::new();
    let key = app
        .create_conference(ORGANIZER, test_conference("RustConf").build())
        .await;

    let (status, json) = app.get(&format!("/api/conference/{key}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "RustConf");
    assert_eq!(json["organizerDisplayName"], "organizer");
    assert_eq!(json["websafeKey"], key);
}

#[tokio::test]
async fn register_and_unregister() {
    let app = TestApp::new();
    let key = app
        .create_conference(ORGANIZER, test_conference("RustConf").with_max_attendees(2).build())
        .await;
    let path = format!("/api/conference/{key}");

    let (status, json) = app.post_empty(&path, Some(ATTENDEE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], true);

    let (_, conference) = app.get(&path, None).await;
    assert_eq!(conference["seatsAvailable"], 1);

    let (_, attending) = app.get("/api/conferences/attending", Some(ATTENDEE)).await;
    assert_eq!(TestApp::names(&attending), vec!["RustConf"]);

    let (status, json) = app.post_empty(&path, Some(ATTENDEE)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "You have already registered for this conference");

    let unregister = format!("{path}/unregister");
    let (status, json) = app.post_empty(&unregister, Some(ATTENDEE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], true);

    let (_, conference) = app.get(&path, None).await;
    assert_eq!(conference["seatsAvailable"], 2);

    let (status, json) = app.post_empty(&unregister, Some(ATTENDEE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], false);
}

#[tokio::test]
async fn sold_out_conference_rejects_registration() {
    let app = TestApp::new();
    let key = app
        .create_conference(ORGANIZER, test_conference("Tiny").with_max_attendees(1).build())
        .await;
    let path = format!("/api/conference/{key}");

    let (status, _) = app.post_empty(&path, Some(ATTENDEE)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app.post_empty(&path, Some("late@example.com")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "There are no seats available.");

    let (_, conference) = app.get(&path, None).await;
    assert_eq!(conference["seatsAvailable"], 0);
}

#[tokio::test]
async fn registering_for_missing_conference_is_not_found() {
    let app = TestApp::new();
    let key = app
        .create_conference(ORGANIZER, test_conference("RustConf").with_max_attendees(1).build())
        .await;

    // A well-formed key for a different kind never resolves to a conference.
    let speaker = app.create_speaker(ORGANIZER, "Ada").await;
    let (status, _) = app
        .post_empty(&format!("/api/conference/{speaker}"), Some(ATTENDEE))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app
        .post_empty(&format!("/api/conference/{key}"), Some(ATTENDEE))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], true);
}

#[tokio::test]
async fn conference_without_capacity_is_sold_out() {
    let app = TestApp::new();
    let key = app
        .create_conference(ORGANIZER, test_conference("Unbounded").build())
        .await;

    let (status, json) = app
        .post_empty(&format!("/api/conference/{key}"), Some(ATTENDEE))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "There are no seats available.");
}

#[tokio::test]
async fn conferences_created_lists_only_own() {
    let app = TestApp::new();
    app.create_conference(ORGANIZER, test_conference("Beta").build()).await;
    app.create_conference(ORGANIZER, test_conference("Alpha").build()).await;
    app.create_conference("other@example.com", test_conference("Gamma").build())
        .await;

    let (status, json) = app
        .post_empty("/api/getConferencesCreated", Some(ORGANIZER))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(TestApp::names(&json), vec!["Alpha", "Beta"]);
}
