//! Profile access.

use tracing::debug;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::{Profile, TeeShirtSize};
use crate::store::EntityStore;

/// User-editable profile fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

/// Load the caller's profile, creating it from the identity on first access.
pub async fn get_or_create(store: &dyn EntityStore, user: &AuthUser) -> AppResult<Profile> {
    if let Some(profile) = store.get_profile(&user.user_id).await? {
        return Ok(profile);
    }

    debug!(user_id = %user.user_id, "creating profile on first access");
    store
        .ensure_profile(&Profile::new(&user.user_id, &user.nickname, &user.email))
        .await
}

/// Apply `update` to the caller's profile and store it.
pub async fn save(
    store: &dyn EntityStore,
    user: &AuthUser,
    update: ProfileUpdate,
) -> AppResult<Profile> {
    let mut profile = get_or_create(store, user).await?;

    if let Some(name) = update.display_name.filter(|n| !n.is_empty()) {
        profile.display_name = Some(name);
    }
    if let Some(size) = update.tee_shirt_size {
        profile.tee_shirt_size = size;
    }

    store.put_profile(&profile).await?;
    Ok(profile)
}
