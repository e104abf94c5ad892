//! Conference query endpoint tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use common::TestApp;
use conclave_test_utils::{filter, test_conference};
use serde_json::json;

const ORGANIZER: &str = "organizer@example.com";

async fn seeded() -> TestApp {
    let app = TestApp::new();
    for body in [
        test_conference("Zig Days")
            .in_city("London")
            .with_max_attendees(5)
            .with_topics(&["Systems"])
            .dated("2026-03-10", "2026-03-11")
            .build(),
        test_conference("RustConf")
            .in_city("Montreal")
            .with_max_attendees(100)
            .with_topics(&["Rust", "Systems"])
            .dated("2026-09-08", "2026-09-10")
            .build(),
        test_conference("EuroRust")
            .in_city("London")
            .with_max_attendees(20)
            .with_topics(&["Rust"])
            .dated("2026-10-01", "2026-10-02")
            .build(),
        test_conference("Full House")
            .in_city("Paris")
            .with_max_attendees(0)
            .dated("2026-09-20", "2026-09-21")
            .build(),
    ] {
        app.create_conference(ORGANIZER, body).await;
    }
    app
}

#[tokio::test]
async fn no_filters_sorts_by_name() {
    let app = seeded().await;
    let (status, json) = app
        .post("/api/queryConferences", None, json!({ "filters": [] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        TestApp::names(&json),
        vec!["EuroRust", "Full House", "RustConf", "Zig Days"]
    );
}

#[tokio::test]
async fn equality_and_inequality_combine() {
    let app = seeded().await;
    let (status, json) = app
        .post(
            "/api/queryConferences",
            None,
            json!({ "filters": [
                filter("CITY", "EQ", "London"),
                filter("MAX_ATTENDEES", "GT", "3"),
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    // Sorted by the inequality field first.
    assert_eq!(TestApp::names(&json), vec!["Zig Days", "EuroRust"]);
}

#[tokio::test]
async fn topic_matches_any_element() {
    let app = seeded().await;
    let (_, json) = app
        .post(
            "/api/queryConferences",
            None,
            json!({ "filters": [filter("TOPIC", "EQ", "Systems")] }),
        )
        .await;
    assert_eq!(TestApp::names(&json), vec!["RustConf", "Zig Days"]);
}

#[tokio::test]
async fn unknown_field_is_rejected() {
    let app = seeded().await;
    let (status, json) = app
        .post(
            "/api/queryConferences",
            None,
            json!({ "filters": [filter("ZIP", "EQ", "12345")] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("invalid field or operator"));
}

#[tokio::test]
async fn two_inequality_fields_are_rejected() {
    let app = seeded().await;
    let (status, json) = app
        .post(
            "/api/queryConferences",
            None,
            json!({ "filters": [
                filter("MONTH", "GT", "1"),
                filter("MAX_ATTENDEES", "LT", "50"),
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Inequality filter is allowed on only one field.");
}

#[tokio::test]
async fn non_numeric_value_for_integer_field_is_rejected() {
    let app = seeded().await;
    let (status, _) = app
        .post(
            "/api/queryConferences",
            None,
            json!({ "filters": [filter("MONTH", "EQ", "June")] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn date_range_is_inclusive() {
    let app = seeded().await;
    let (status, json) = app
        .post(
            "/api/conferences/dateRange",
            None,
            json!({ "startDate": "2026-09-08", "endDate": "2026-10-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        TestApp::names(&json),
        vec!["RustConf", "Full House", "EuroRust"]
    );
}

#[tokio::test]
async fn available_in_month_skips_sold_out() {
    let app = seeded().await;
    let (status, json) = app
        .post("/api/conferences/available", None, json!({ "month": 9 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(TestApp::names(&json), vec!["RustConf"]);
}

#[tokio::test]
async fn by_city() {
    let app = seeded().await;
    let (_, json) = app
        .post("/api/conferences/city", None, json!({ "city": "London" }))
        .await;
    assert_eq!(TestApp::names(&json), vec!["EuroRust", "Zig Days"]);
}
