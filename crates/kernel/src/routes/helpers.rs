//! Shared route helpers: entity lookup by websafe key and query execution.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::AppResult;
use crate::form::{ConferenceForm, ConferenceForms, SessionForm, SessionForms};
use crate::models::key::{self, EntityKind};
use crate::models::{Conference, ConferenceField, Session, SessionField, Speaker};
use crate::query::{EntityQuery, FilterTriple, FilterValue, translate};
use crate::state::AppState;
use crate::store;

/// Load a conference by websafe key, or `NotFound`.
pub async fn load_conference(state: &AppState, websafe_key: &str) -> AppResult<Conference> {
    let id = key::decode(EntityKind::Conference, websafe_key)?;
    state
        .store()
        .get_conference(id)
        .await?
        .ok_or_else(|| key::not_found(EntityKind::Conference, websafe_key))
}

/// Load a session by websafe key, or `NotFound`.
pub async fn load_session(state: &AppState, websafe_key: &str) -> AppResult<Session> {
    let id = key::decode(EntityKind::Session, websafe_key)?;
    state
        .store()
        .get_session(id)
        .await?
        .ok_or_else(|| key::not_found(EntityKind::Session, websafe_key))
}

/// Load a speaker by websafe key, or `NotFound`.
pub async fn load_speaker(state: &AppState, websafe_key: &str) -> AppResult<Speaker> {
    let id = key::decode(EntityKind::Speaker, websafe_key)?;
    state
        .store()
        .get_speaker(id)
        .await?
        .ok_or_else(|| key::not_found(EntityKind::Speaker, websafe_key))
}

/// Translate `filters` and run them against all conferences.
pub async fn query_conferences(
    state: &AppState,
    filters: &[FilterTriple],
) -> AppResult<Vec<Conference>> {
    let query = EntityQuery::new(None, translate::<ConferenceField>(filters)?);
    state.metrics().record_query("conference");
    store::collect(state.store().query_conferences(query)).await
}

/// Translate `filters` and run them against sessions, optionally within
/// one conference.
pub async fn query_sessions(
    state: &AppState,
    conference_id: Option<Uuid>,
    filters: &[FilterTriple],
) -> AppResult<Vec<Session>> {
    let query = EntityQuery::new(
        conference_id.map(FilterValue::Key),
        translate::<SessionField>(filters)?,
    );
    state.metrics().record_query("session");
    store::collect(state.store().query_sessions(query)).await
}

pub fn conference_forms(conferences: &[Conference]) -> ConferenceForms {
    conferences
        .iter()
        .map(|c| ConferenceForm::from_conference(c, None))
        .collect()
}

/// Render sessions, resolving each distinct speaker's name once.
pub async fn session_forms(state: &AppState, sessions: &[Session]) -> AppResult<SessionForms> {
    let mut speaker_names: HashMap<Uuid, Option<String>> = HashMap::new();

    for speaker_id in sessions.iter().filter_map(|s| s.speaker_id) {
        if speaker_names.contains_key(&speaker_id) {
            continue;
        }
        let name = state.store().get_speaker(speaker_id).await?.map(|s| s.name);
        speaker_names.insert(speaker_id, name);
    }

    Ok(sessions
        .iter()
        .map(|session| {
            let name = session
                .speaker_id
                .and_then(|id| speaker_names.get(&id))
                .and_then(Option::as_deref);
            SessionForm::from_session(session, name)
        })
        .collect())
}
