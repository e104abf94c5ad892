//! Nearly-sold-out announcement.

use tracing::{debug, info};

use crate::cache::{KeyValueCache, RECENT_ANNOUNCEMENTS_KEY};
use crate::error::AppResult;
use crate::models::ConferenceField;
use crate::query::{EntityQuery, FilterTriple, translate};
use crate::store::{self, EntityStore};

/// Conferences with this many seats or fewer (but at least one) are listed.
pub const NEARLY_SOLD_OUT_SEATS: i32 = 5;

const ANNOUNCEMENT_PREFIX: &str =
    "Last chance to attend! The following conferences are nearly sold out:";

/// Conferences with between 1 and [`NEARLY_SOLD_OUT_SEATS`] seats left.
pub fn nearly_sold_out_query() -> AppResult<EntityQuery<ConferenceField>> {
    let translated = translate(&[
        FilterTriple::new("SEATS_AVAILABLE", "LTEQ", &NEARLY_SOLD_OUT_SEATS.to_string()),
        FilterTriple::new("SEATS_AVAILABLE", "GT", "0"),
    ])?;
    Ok(EntityQuery::new(None, translated))
}

/// Announcement text for the given conference names, `None` when empty.
pub fn format_announcement(names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    Some(format!("{ANNOUNCEMENT_PREFIX} {}", names.join(", ")))
}

/// Recompute the announcement and store it, or delete the cached entry when
/// no conference qualifies. Returns the announcement, empty when deleted.
pub async fn refresh_announcement(
    store: &dyn EntityStore,
    cache: &dyn KeyValueCache,
) -> AppResult<String> {
    let conferences = store::collect(store.query_conferences(nearly_sold_out_query()?)).await?;
    let names: Vec<String> = conferences.into_iter().map(|c| c.name).collect();

    match format_announcement(&names) {
        Some(announcement) => {
            cache.set(RECENT_ANNOUNCEMENTS_KEY, &announcement).await;
            info!(conferences = names.len(), "announcement refreshed");
            Ok(announcement)
        }
        None => {
            cache.delete(RECENT_ANNOUNCEMENTS_KEY).await;
            debug!("no nearly sold out conferences, announcement cleared");
            Ok(String::new())
        }
    }
}
