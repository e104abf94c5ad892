//! Featured speaker.
//!
//! A speaker with more than one session in a conference becomes the featured
//! speaker. Recomputed by a background task after each session is created.

use tracing::info;
use uuid::Uuid;

use crate::cache::{FEATURED_SPEAKER_KEY, KeyValueCache};
use crate::error::AppResult;
use crate::models::key::{self, EntityKind};
use crate::query::{EntityQuery, FilterTriple, FilterValue, translate};
use crate::store::{self, EntityStore};

/// Featured speaker message.
pub fn format_featured(speaker_name: &str, session_names: &[String]) -> String {
    format!(
        "Featured speaker: {speaker_name}. Sessions: {}",
        session_names.join(", ")
    )
}

/// Check whether the speaker qualifies in the conference and, if so, cache
/// the message. Returns the message when one was stored.
pub async fn update_featured_speaker(
    store: &dyn EntityStore,
    cache: &dyn KeyValueCache,
    conference_id: Uuid,
    speaker_id: Uuid,
) -> AppResult<Option<String>> {
    let speaker_key = key::encode(EntityKind::Speaker, speaker_id);
    let translated = translate(&[FilterTriple::new("SPEAKER", "EQ", &speaker_key)])?;
    let query = EntityQuery::new(Some(FilterValue::Key(conference_id)), translated);

    let sessions = store::collect(store.query_sessions(query)).await?;
    if sessions.len() < 2 {
        return Ok(None);
    }

    let speaker = store
        .get_speaker(speaker_id)
        .await?
        .ok_or_else(|| key::not_found(EntityKind::Speaker, &speaker_key))?;

    let names: Vec<String> = sessions.into_iter().map(|s| s.name).collect();
    let message = format_featured(&speaker.name, &names);
    cache.set(FEATURED_SPEAKER_KEY, &message).await;

    info!(speaker = %speaker.name, sessions = names.len(), "featured speaker updated");
    Ok(Some(message))
}
