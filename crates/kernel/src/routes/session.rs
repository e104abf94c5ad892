//! Session routes.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use super::helpers::{load_conference, load_speaker, query_sessions, session_forms};
use crate::error::{AppError, AppResult};
use crate::form::{SessionForm, SessionForms, SessionQueryForms, SpecificQueryForm};
use crate::middleware::AuthUser;
use crate::models::key::{self, EntityKind};
use crate::query::FilterTriple;
use crate::state::AppState;
use crate::tasks::Task;

/// Create the session router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/conference/{key}/addsession", post(create_session))
        .route("/api/conference/{key}/sessions", get(conference_sessions))
        .route(
            "/api/conference/{key}/sessions/type/{type_of_session}",
            get(conference_sessions_by_type),
        )
        .route("/api/conference/{key}/querySessions", post(query_conference_sessions))
        .route("/api/speaker/{key}/sessions", get(sessions_by_speaker))
        .route("/api/sessions/duration", post(sessions_by_duration))
        .route("/api/sessions/problem", get(session_problem))
}

async fn create_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
    Json(form): Json<SessionForm>,
) -> AppResult<Json<SessionForm>> {
    let conference_id = key::decode(EntityKind::Conference, &key)?;
    let session = form.into_new_session(conference_id)?;

    let conference = load_conference(&state, &key).await?;
    if conference.organizer_user_id != user.user_id {
        return Err(AppError::Unauthorized(
            "Only the conference organizer can create sessions.".to_string(),
        ));
    }

    let speaker = match &session.speaker_key() {
        Some(speaker_key) => Some(load_speaker(&state, speaker_key).await?),
        None => None,
    };

    state.store().insert_session(&session).await?;
    info!(session_id = %session.id, conference_id = %conference.id, "session created");

    if let Some(speaker) = &speaker {
        state
            .tasks()
            .dispatch(Task::SetFeaturedSpeaker {
                conference_key: conference.websafe_key(),
                speaker_key: speaker.websafe_key(),
            })
            .await;
    }

    Ok(Json(SessionForm::from_session(
        &session,
        speaker.as_ref().map(|s| s.name.as_str()),
    )))
}

async fn conference_sessions(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<SessionForms>> {
    let conference = load_conference(&state, &key).await?;
    let sessions = query_sessions(&state, Some(conference.id), &[]).await?;
    Ok(Json(session_forms(&state, &sessions).await?))
}

async fn conference_sessions_by_type(
    State(state): State<AppState>,
    Path((key, type_of_session)): Path<(String, String)>,
) -> AppResult<Json<SessionForms>> {
    let conference = load_conference(&state, &key).await?;
    let filters = [FilterTriple::new("TYPE_OF_SESSION", "EQ", &type_of_session)];
    let sessions = query_sessions(&state, Some(conference.id), &filters).await?;
    Ok(Json(session_forms(&state, &sessions).await?))
}

async fn query_conference_sessions(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(form): Json<SessionQueryForms>,
) -> AppResult<Json<SessionForms>> {
    let conference = load_conference(&state, &key).await?;
    let sessions = query_sessions(&state, Some(conference.id), &form.filters).await?;
    Ok(Json(session_forms(&state, &sessions).await?))
}

async fn sessions_by_speaker(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<SessionForms>> {
    let speaker = load_speaker(&state, &key).await?;
    let filters = [FilterTriple::new("SPEAKER", "EQ", &speaker.websafe_key())];
    let sessions = query_sessions(&state, None, &filters).await?;
    Ok(Json(session_forms(&state, &sessions).await?))
}

async fn sessions_by_duration(
    State(state): State<AppState>,
    Json(form): Json<SpecificQueryForm>,
) -> AppResult<Json<SessionForms>> {
    let sessions = query_sessions(&state, None, &[form.to_filter("DURATION")]).await?;
    Ok(Json(session_forms(&state, &sessions).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemQuery {
    #[serde(default = "default_excluded_type")]
    exclude_type: String,
    #[serde(default = "default_cutoff")]
    before: String,
}

fn default_excluded_type() -> String {
    "workshop".to_string()
}

fn default_cutoff() -> String {
    "19:00".to_string()
}

/// Sessions that are not of one type and start before a cutoff.
///
/// Each query may range-filter only one field, so the two conditions run
/// separately and are intersected here, keeping start-time order.
async fn session_problem(
    State(state): State<AppState>,
    Query(params): Query<ProblemQuery>,
) -> AppResult<Json<SessionForms>> {
    let other_types = query_sessions(
        &state,
        None,
        &[FilterTriple::new("TYPE_OF_SESSION", "NE", &params.exclude_type)],
    )
    .await?;
    let early = query_sessions(
        &state,
        None,
        &[FilterTriple::new("START_TIME", "LT", &params.before)],
    )
    .await?;

    let allowed: HashSet<_> = other_types.iter().map(|s| s.id).collect();
    let sessions: Vec<_> = early.into_iter().filter(|s| allowed.contains(&s.id)).collect();

    Ok(Json(session_forms(&state, &sessions).await?))
}
