//! Speaker routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use super::helpers::load_speaker;
use crate::cache::FEATURED_SPEAKER_KEY;
use crate::error::AppResult;
use crate::form::{SpeakerForm, StringMessage};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Create the speaker router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/speaker", post(create_speaker))
        .route("/api/speaker/{key}", get(get_speaker))
        .route("/api/featuredSpeaker", get(featured_speaker))
}

async fn create_speaker(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<SpeakerForm>,
) -> AppResult<Json<SpeakerForm>> {
    let speaker = form.into_new_speaker(&user.user_id)?;
    state.store().insert_speaker(&speaker).await?;
    Ok(Json(SpeakerForm::from_speaker(&speaker)))
}

async fn get_speaker(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<SpeakerForm>> {
    let speaker = load_speaker(&state, &key).await?;
    Ok(Json(SpeakerForm::from_speaker(&speaker)))
}

async fn featured_speaker(State(state): State<AppState>) -> Json<StringMessage> {
    let data = match state.cache().get(FEATURED_SPEAKER_KEY).await {
        Some(text) => {
            state.metrics().record_cache_hit();
            text
        }
        None => {
            state.metrics().record_cache_miss();
            String::new()
        }
    };
    Json(StringMessage { data })
}
