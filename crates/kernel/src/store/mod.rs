//! Entity persistence.
//!
//! [`EntityStore`] is the seam between handlers and storage. `PgStore` backs
//! it with PostgreSQL; `MemoryStore` keeps everything in process and is what
//! the integration tests drive.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Conference, ConferenceField, Profile, Session, SessionField, Speaker};
use crate::query::EntityQuery;
use crate::services::registration::RegistrationOp;
use crate::services::wishlist::WishlistOp;

/// A lazily evaluated sequence of query results.
pub type EntityStream<T> = Pin<Box<dyn Stream<Item = AppResult<T>> + Send>>;

/// Storage operations used by the HTTP layer and background tasks.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<Profile>>;

    /// Insert or replace a profile.
    async fn put_profile(&self, profile: &Profile) -> AppResult<()>;

    /// Store `profile` unless one already exists for its user, then return
    /// whichever profile is stored.
    async fn ensure_profile(&self, profile: &Profile) -> AppResult<Profile>;

    async fn insert_conference(&self, conference: &Conference) -> AppResult<()>;

    async fn get_conference(&self, id: Uuid) -> AppResult<Option<Conference>>;

    /// Fetch several conferences, in the order given, skipping missing ids.
    async fn get_conferences(&self, ids: &[Uuid]) -> AppResult<Vec<Conference>>;

    /// Run a conference query. Nothing executes until the stream is polled.
    fn query_conferences(&self, query: EntityQuery<ConferenceField>) -> EntityStream<Conference>;

    async fn insert_session(&self, session: &Session) -> AppResult<()>;

    async fn get_session(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Fetch several sessions, in the order given, skipping missing ids.
    async fn get_sessions(&self, ids: &[Uuid]) -> AppResult<Vec<Session>>;

    /// Run a session query. Nothing executes until the stream is polled.
    fn query_sessions(&self, query: EntityQuery<SessionField>) -> EntityStream<Session>;

    async fn insert_speaker(&self, speaker: &Speaker) -> AppResult<()>;

    async fn get_speaker(&self, id: Uuid) -> AppResult<Option<Speaker>>;

    /// Register or unregister `user_id` for a conference as one atomic unit
    /// over the profile and the conference.
    ///
    /// Returns `NotFound` when the conference does not exist; on any error
    /// neither entity is written.
    async fn update_registration(
        &self,
        user_id: &str,
        conference_id: Uuid,
        op: RegistrationOp,
    ) -> AppResult<bool>;

    /// Add or remove a session key on the profile's wishlist atomically.
    async fn update_wishlist(
        &self,
        user_id: &str,
        session_key: &str,
        op: WishlistOp,
    ) -> AppResult<bool>;

    async fn check_health(&self) -> bool;
}

/// Drain a result stream into a vector, stopping at the first error.
pub async fn collect<T>(mut stream: EntityStream<T>) -> AppResult<Vec<T>> {
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item?);
    }
    Ok(items)
}
