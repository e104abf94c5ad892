//! Cron route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;
use crate::tasks::CronResult;

/// Create the cron router.
pub fn router() -> Router<AppState> {
    Router::new().route("/cron/{key}", post(run_cron))
}

/// Cron run response.
#[derive(Debug, Serialize)]
pub struct CronResponse {
    pub status: String,
    pub tasks: Option<Vec<String>>,
    pub duration_ms: Option<u64>,
    pub message: Option<String>,
}

/// Run cron tasks (protected by secret key).
async fn run_cron(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    if key != state.cron_key() {
        info!("invalid cron key");
        return (
            StatusCode::FORBIDDEN,
            Json(CronResponse {
                status: "error".to_string(),
                tasks: None,
                duration_ms: None,
                message: Some("Invalid cron key".to_string()),
            }),
        )
            .into_response();
    }

    info!("cron triggered via HTTP");
    match state.cron().run().await {
        CronResult::Completed {
            tasks_run,
            duration_ms,
        } => (
            StatusCode::OK,
            Json(CronResponse {
                status: "completed".to_string(),
                tasks: Some(tasks_run),
                duration_ms: Some(duration_ms),
                message: None,
            }),
        )
            .into_response(),
        CronResult::Failed(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CronResponse {
                status: "failed".to_string(),
                tasks: None,
                duration_ms: None,
                message: Some(error),
            }),
        )
            .into_response(),
    }
}
