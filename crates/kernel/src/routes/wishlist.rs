//! Session wishlist routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use super::helpers::{load_session, session_forms};
use crate::error::AppResult;
use crate::form::{BooleanMessage, SessionForms};
use crate::middleware::AuthUser;
use crate::models::key::{self, EntityKind};
use crate::services::profile;
use crate::services::wishlist::WishlistOp;
use crate::state::AppState;

/// Create the wishlist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile/wishlist", get(wishlist))
        .route(
            "/api/profile/wishlist/{session_key}",
            post(add_to_wishlist).delete(remove_from_wishlist),
        )
}

async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_key): Path<String>,
) -> AppResult<Json<BooleanMessage>> {
    let session = load_session(&state, &session_key).await?;
    profile::get_or_create(state.store(), &user).await?;

    let added = state
        .store()
        .update_wishlist(&user.user_id, &session.websafe_key(), WishlistOp::Add)
        .await?;
    Ok(Json(BooleanMessage { data: added }))
}

async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_key): Path<String>,
) -> AppResult<Json<BooleanMessage>> {
    let session_id = key::decode(EntityKind::Session, &session_key)?;
    profile::get_or_create(state.store(), &user).await?;

    let removed = state
        .store()
        .update_wishlist(
            &user.user_id,
            &key::encode(EntityKind::Session, session_id),
            WishlistOp::Remove,
        )
        .await?;
    Ok(Json(BooleanMessage { data: removed }))
}

async fn wishlist(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<SessionForms>> {
    let profile = profile::get_or_create(state.store(), &user).await?;
    let ids: Vec<_> = profile
        .sessions_wishlist
        .iter()
        .filter_map(|k| key::try_decode(EntityKind::Session, k))
        .collect();

    let sessions = state.store().get_sessions(&ids).await?;
    Ok(Json(session_forms(&state, &sessions).await?))
}
