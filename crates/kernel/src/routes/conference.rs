//! Conference routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tracing::info;

use super::helpers::{conference_forms, load_conference, query_conferences};
use crate::cache::RECENT_ANNOUNCEMENTS_KEY;
use crate::error::{AppError, AppResult};
use crate::form::{
    BooleanMessage, ConferenceAvailableForm, ConferenceDateRangeForm, ConferenceForm,
    ConferenceForms, ConferenceQueryForms, LocationQueryForm, StringMessage,
};
use crate::middleware::AuthUser;
use crate::models::key::{self, EntityKind};
use crate::models::Conference;
use crate::query::{EntityQuery, FilterValue};
use crate::services::profile;
use crate::services::registration::RegistrationOp;
use crate::state::AppState;
use crate::store;
use crate::tasks::Task;

/// Create the conference router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/conference", post(create_conference))
        .route("/api/queryConferences", post(query))
        .route("/api/getConferencesCreated", post(conferences_created))
        .route("/api/conferences/attending", get(conferences_to_attend))
        .route("/api/conferences/dateRange", post(conferences_by_date_range))
        .route("/api/conferences/available", post(conferences_available))
        .route("/api/conferences/city", post(conferences_by_city))
        .route("/api/conference/announcement/get", get(announcement))
        .route("/api/conference/{key}", get(get_conference).post(register))
        .route("/api/conference/{key}/unregister", post(unregister))
}

/// Plain-text summary mailed to the organizer.
fn conference_summary(conference: &Conference, site_url: &str) -> String {
    let mut lines = vec![format!("Name: {}", conference.name)];
    if let Some(city) = &conference.city {
        lines.push(format!("City: {city}"));
    }
    if let Some(start) = conference.start_date {
        lines.push(format!("Starts: {start}"));
    }
    if let Some(end) = conference.end_date {
        lines.push(format!("Ends: {end}"));
    }
    lines.push(format!("Topics: {}", conference.topics.join(", ")));
    lines.push(format!("Seats: {}", conference.max_attendees));
    lines.push(format!(
        "{site_url}/api/conference/{}",
        conference.websafe_key()
    ));
    lines.join("\r\n")
}

async fn create_conference(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<ConferenceForm>,
) -> AppResult<Json<ConferenceForm>> {
    let organizer = profile::get_or_create(state.store(), &user).await?;
    let conference = form.into_new_conference(&user.user_id)?;

    state.store().insert_conference(&conference).await?;
    info!(
        conference_id = %conference.id,
        organizer = %user.user_id,
        "conference created"
    );

    state
        .tasks()
        .dispatch(Task::SendConfirmationEmail {
            email: user.email.clone(),
            conference_info: conference_summary(&conference, state.site_url()),
        })
        .await;

    Ok(Json(ConferenceForm::from_conference(
        &conference,
        organizer.display_name.as_deref(),
    )))
}

async fn query(
    State(state): State<AppState>,
    Json(form): Json<ConferenceQueryForms>,
) -> AppResult<Json<ConferenceForms>> {
    let conferences = query_conferences(&state, &form.filters).await?;
    Ok(Json(conference_forms(&conferences)))
}

async fn conferences_created(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ConferenceForms>> {
    let organizer = profile::get_or_create(state.store(), &user).await?;
    let query = EntityQuery::children_of(FilterValue::Text(user.user_id.clone()));
    let conferences = store::collect(state.store().query_conferences(query)).await?;

    Ok(Json(
        conferences
            .iter()
            .map(|c| ConferenceForm::from_conference(c, organizer.display_name.as_deref()))
            .collect(),
    ))
}

async fn conferences_to_attend(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ConferenceForms>> {
    let profile = profile::get_or_create(state.store(), &user).await?;
    let ids: Vec<_> = profile
        .conference_keys_to_attend
        .iter()
        .filter_map(|k| key::try_decode(EntityKind::Conference, k))
        .collect();

    let conferences = state.store().get_conferences(&ids).await?;
    Ok(Json(conference_forms(&conferences)))
}

async fn get_conference(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<ConferenceForm>> {
    let conference = load_conference(&state, &key).await?;
    let organizer = state.store().get_profile(&conference.organizer_user_id).await?;

    Ok(Json(ConferenceForm::from_conference(
        &conference,
        organizer.as_ref().and_then(|p| p.display_name.as_deref()),
    )))
}

async fn change_registration(
    state: &AppState,
    user: &AuthUser,
    websafe_key: &str,
    op: RegistrationOp,
) -> AppResult<BooleanMessage> {
    profile::get_or_create(state.store(), user).await?;
    let conference_id = key::decode(EntityKind::Conference, websafe_key)?;

    let result = state
        .store()
        .update_registration(&user.user_id, conference_id, op)
        .await;

    let outcome = match &result {
        Ok(true) => "changed",
        Ok(false) => "unchanged",
        Err(AppError::Conflict(conflict)) => conflict.label(),
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    state.metrics().record_registration(op.as_str(), outcome);

    Ok(BooleanMessage { data: result? })
}

async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<BooleanMessage>> {
    change_registration(&state, &user, &key, RegistrationOp::Register)
        .await
        .map(Json)
}

async fn unregister(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<BooleanMessage>> {
    change_registration(&state, &user, &key, RegistrationOp::Unregister)
        .await
        .map(Json)
}

async fn announcement(State(state): State<AppState>) -> Json<StringMessage> {
    let data = match state.cache().get(RECENT_ANNOUNCEMENTS_KEY).await {
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

async fn conferences_by_date_range(
    State(state): State<AppState>,
    Json(form): Json<ConferenceDateRangeForm>,
) -> AppResult<Json<ConferenceForms>> {
    let conferences = query_conferences(&state, &form.to_filters()).await?;
    Ok(Json(conference_forms(&conferences)))
}

async fn conferences_available(
    State(state): State<AppState>,
    Json(form): Json<ConferenceAvailableForm>,
) -> AppResult<Json<ConferenceForms>> {
    let conferences = query_conferences(&state, &form.to_filters()).await?;
    Ok(Json(conference_forms(&conferences)))
}

async fn conferences_by_city(
    State(state): State<AppState>,
    Json(form): Json<LocationQueryForm>,
) -> AppResult<Json<ConferenceForms>> {
    let conferences = query_conferences(&state, &form.to_filters()).await?;
    Ok(Json(conference_forms(&conferences)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn summary_links_to_the_conference() {
        let conference = Conference {
            id: Uuid::now_v7(),
            name: "RustConf".to_string(),
            description: None,
            organizer_user_id: "org@example.com".to_string(),
            topics: vec!["Rust".to_string()],
            city: Some("Montreal".to_string()),
            start_date: None,
            month: 0,
            end_date: None,
            max_attendees: 10,
            seats_available: 10,
        };

        let summary = conference_summary(&conference, "https://conclave.example");
        assert!(summary.starts_with("Name: RustConf\r\nCity: Montreal"));
        assert!(summary.ends_with(&format!(
            "https://conclave.example/api/conference/{}",
            conference.websafe_key()
        )));
    }
}
