//! Profile routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::AppResult;
use crate::form::{ProfileForm, ProfileMiniForm};
use crate::middleware::AuthUser;
use crate::services::profile;
use crate::state::AppState;

/// Create the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", get(get_profile).post(save_profile))
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ProfileForm>> {
    let profile = profile::get_or_create(state.store(), &user).await?;
    Ok(Json(ProfileForm::from(&profile)))
}

async fn save_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<ProfileMiniForm>,
) -> AppResult<Json<ProfileForm>> {
    let profile = profile::save(state.store(), &user, form.into()).await?;
    Ok(Json(ProfileForm::from(&profile)))
}
