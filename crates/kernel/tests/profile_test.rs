//! Profile and wishlist endpoint tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use conclave_test_utils::{test_conference, test_session};
use serde_json::json;

const USER: &str = "ada@example.com";

#[tokio::test]
async fn profile_is_created_on_first_read() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app.get("/api/profile", Some(USER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["displayName"], "ada");
    assert_eq!(json["mainEmail"], USER);
    assert_eq!(json["teeShirtSize"], "NOT_SPECIFIED");
    assert_eq!(json["conferenceKeysToAttend"], json!([]));
}

#[tokio::test]
async fn save_updates_only_supplied_fields() {
    let app = TestApp::new();

    let (status, json) = app
        .post("/api/profile", Some(USER), json!({ "teeShirtSize": "M_W" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["teeShirtSize"], "M_W");
    assert_eq!(json["displayName"], "ada");

    let (_, json) = app
        .post("/api/profile", Some(USER), json!({ "displayName": "Countess" }))
        .await;
    assert_eq!(json["displayName"], "Countess");
    assert_eq!(json["teeShirtSize"], "M_W");

    let (_, json) = app.get("/api/profile", Some(USER)).await;
    assert_eq!(json["displayName"], "Countess");
}

#[tokio::test]
async fn wishlist_add_list_remove() {
    let app = TestApp::new();
    let organizer = "organizer@example.com";
    let conference = app
        .create_conference(organizer, test_conference("RustConf").build())
        .await;
    let session = app
        .create_session(organizer, &conference, test_session("Borrowck").build())
        .await;
    let path = format!("/api/profile/wishlist/{session}");

    let (status, json) = app.post_empty(&path, Some(USER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], true);

    let (status, json) = app.post_empty(&path, Some(USER)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Session is already in your wishlist");

    let (_, json) = app.get("/api/profile/wishlist", Some(USER)).await;
    assert_eq!(TestApp::names(&json), vec!["Borrowck"]);

    let (status, json) = app.request(Method::DELETE, &path, Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], true);

    let (_, json) = app.request(Method::DELETE, &path, Some(USER), None).await;
    assert_eq!(json["data"], false);

    let (_, json) = app.get("/api/profile/wishlist", Some(USER)).await;
    assert!(TestApp::names(&json).is_empty());
}

#[tokio::test]
async fn wishlist_rejects_unknown_session() {
    let app = TestApp::new();
    let (status, _) = app
        .post_empty("/api/profile/wishlist/nonsense", Some(USER))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
