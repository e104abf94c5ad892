//! In-process entity store.
//!
//! Holds every entity behind one mutex, so each operation (registration
//! included) is a single critical section. Queries are evaluated through the
//! same [`EntityQuery`] the Postgres store renders to SQL.

use std::collections::HashMap;
use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{EntityStore, EntityStream};
use crate::error::{AppError, AppResult};
use crate::models::key::{self, EntityKind};
use crate::models::{Conference, ConferenceField, Profile, Session, SessionField, Speaker};
use crate::query::{EntityQuery, Queryable};
use crate::services::registration::{RegistrationOp, apply_registration};
use crate::services::wishlist::{WishlistOp, apply_wishlist};

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, Profile>,
    conferences: HashMap<Uuid, Conference>,
    sessions: HashMap<Uuid, Session>,
    speakers: HashMap<Uuid, Speaker>,
}

/// Entity store kept entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Evaluate `query` over a snapshot of `select(tables)` when first polled.
fn query_stream<E>(
    tables: Arc<Mutex<Tables>>,
    query: EntityQuery<E::Field>,
    select: fn(&Tables) -> &HashMap<Uuid, E>,
) -> EntityStream<E>
where
    E: Queryable,
{
    Box::pin(stream! {
        let mut matched: Vec<E> = {
            let tables = tables.lock();
            select(&tables)
                .values()
                .filter(|entity| query.matches(*entity))
                .cloned()
                .collect()
        };
        matched.sort_by(|a, b| query.compare(a, b));

        for entity in matched {
            yield Ok::<E, AppError>(entity);
        }
    })
}

fn profile_not_found(user_id: &str) -> AppError {
    AppError::NotFound(format!("No profile found for user: {user_id}"))
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<Profile>> {
        Ok(self.tables.lock().profiles.get(user_id).cloned())
    }

    async fn put_profile(&self, profile: &Profile) -> AppResult<()> {
        self.tables
            .lock()
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn ensure_profile(&self, profile: &Profile) -> AppResult<Profile> {
        Ok(self
            .tables
            .lock()
            .profiles
            .entry(profile.user_id.clone())
            .or_insert_with(|| profile.clone())
            .clone())
    }

    async fn insert_conference(&self, conference: &Conference) -> AppResult<()> {
        self.tables
            .lock()
            .conferences
            .insert(conference.id, conference.clone());
        Ok(())
    }

    async fn get_conference(&self, id: Uuid) -> AppResult<Option<Conference>> {
        Ok(self.tables.lock().conferences.get(&id).cloned())
    }

    async fn get_conferences(&self, ids: &[Uuid]) -> AppResult<Vec<Conference>> {
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.conferences.get(id).cloned())
            .collect())
    }

    fn query_conferences(&self, query: EntityQuery<ConferenceField>) -> EntityStream<Conference> {
        query_stream(self.tables.clone(), query, |t| &t.conferences)
    }

    async fn insert_session(&self, session: &Session) -> AppResult<()> {
        self.tables
            .lock()
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.tables.lock().sessions.get(&id).cloned())
    }

    async fn get_sessions(&self, ids: &[Uuid]) -> AppResult<Vec<Session>> {
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.sessions.get(id).cloned())
            .collect())
    }

    fn query_sessions(&self, query: EntityQuery<SessionField>) -> EntityStream<Session> {
        query_stream(self.tables.clone(), query, |t| &t.sessions)
    }

    async fn insert_speaker(&self, speaker: &Speaker) -> AppResult<()> {
        self.tables
            .lock()
            .speakers
            .insert(speaker.id, speaker.clone());
        Ok(())
    }

    async fn get_speaker(&self, id: Uuid) -> AppResult<Option<Speaker>> {
        Ok(self.tables.lock().speakers.get(&id).cloned())
    }

    async fn update_registration(
        &self,
        user_id: &str,
        conference_id: Uuid,
        op: RegistrationOp,
    ) -> AppResult<bool> {
        let mut tables = self.tables.lock();

        // Work on copies; they replace the stored entities only on success.
        let mut profile = tables
            .profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| profile_not_found(user_id))?;
        let mut conference = tables
            .conferences
            .get(&conference_id)
            .cloned()
            .ok_or_else(|| {
                key::not_found(
                    EntityKind::Conference,
                    &key::encode(EntityKind::Conference, conference_id),
                )
            })?;

        let changed = apply_registration(&mut profile, &mut conference, op)?;

        tables.profiles.insert(profile.user_id.clone(), profile);
        tables.conferences.insert(conference.id, conference);
        Ok(changed)
    }

    async fn update_wishlist(
        &self,
        user_id: &str,
        session_key: &str,
        op: WishlistOp,
    ) -> AppResult<bool> {
        let mut tables = self.tables.lock();

        let mut profile = tables
            .profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| profile_not_found(user_id))?;

        let changed = apply_wishlist(&mut profile, session_key, op)?;

        tables.profiles.insert(profile.user_id.clone(), profile);
        Ok(changed)
    }

    async fn check_health(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::Conflict;
    use crate::query::{FilterTriple, translate};
    use crate::store::collect;

    fn conference(name: &str, max: i32) -> Conference {
        Conference {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            organizer_user_id: "org@example.com".to_string(),
            topics: Vec::new(),
            city: Some("London".to_string()),
            start_date: None,
            month: 0,
            end_date: None,
            max_attendees: max,
            seats_available: max,
        }
    }

    async fn seeded(seats: i32) -> (MemoryStore, Conference) {
        let store = MemoryStore::new();
        let conf = conference("RustConf", seats);
        store.insert_conference(&conf).await.unwrap();
        store
            .put_profile(&Profile::new("ada@example.com", "ada", "ada@example.com"))
            .await
            .unwrap();
        (store, conf)
    }

    #[tokio::test]
    async fn registration_persists_both_entities() {
        let (store, conf) = seeded(10).await;

        let changed = store
            .update_registration("ada@example.com", conf.id, RegistrationOp::Register)
            .await
            .unwrap();
        assert!(changed);

        let stored = store.get_conference(conf.id).await.unwrap().unwrap();
        assert_eq!(stored.seats_available, 9);
        let profile = store.get_profile("ada@example.com").await.unwrap().unwrap();
        assert!(profile.is_attending(&conf.websafe_key()));
    }

    #[tokio::test]
    async fn failed_registration_writes_nothing() {
        let (store, conf) = seeded(0).await;

        let err = store
            .update_registration("ada@example.com", conf.id, RegistrationOp::Register)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(Conflict::SoldOut)));

        let profile = store.get_profile("ada@example.com").await.unwrap().unwrap();
        assert!(profile.conference_keys_to_attend.is_empty());
    }

    #[tokio::test]
    async fn unknown_conference_is_not_found() {
        let (store, _) = seeded(10).await;

        let err = store
            .update_registration("ada@example.com", Uuid::now_v7(), RegistrationOp::Register)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_registrations_never_oversell() {
        let store = MemoryStore::new();
        let conf = conference("Tiny", 3);
        store.insert_conference(&conf).await.unwrap();
        let conference_id = conf.id;

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            let user = format!("user{i}@example.com");
            handles.push(tokio::spawn(async move {
                store
                    .put_profile(&Profile::new(&user, &user, &user))
                    .await
                    .unwrap();
                store
                    .update_registration(&user, conference_id, RegistrationOp::Register)
                    .await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        let stored = store.get_conference(conf.id).await.unwrap().unwrap();
        assert_eq!(stored.seats_available, 0);
    }

    #[tokio::test]
    async fn query_is_lazy_and_restartable() {
        let store = MemoryStore::new();
        store.insert_conference(&conference("Beta", 20)).await.unwrap();
        store.insert_conference(&conference("Alpha", 50)).await.unwrap();

        let query = EntityQuery::new(
            None,
            translate(&[FilterTriple::new("MAX_ATTENDEES", "GT", "10")]).unwrap(),
        );

        let pending = store.query_conferences(query.clone());
        // Inserted after the stream was created but before it was polled.
        store.insert_conference(&conference("Gamma", 30)).await.unwrap();

        let names: Vec<String> = collect(pending)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Beta", "Gamma", "Alpha"]);

        let again = collect(store.query_conferences(query)).await.unwrap();
        assert_eq!(again.len(), 3);
    }

    #[tokio::test]
    async fn batch_fetch_keeps_order_and_skips_missing() {
        let store = MemoryStore::new();
        let a = conference("A", 1);
        let b = conference("B", 1);
        store.insert_conference(&a).await.unwrap();
        store.insert_conference(&b).await.unwrap();

        let fetched = store
            .get_conferences(&[b.id, Uuid::now_v7(), a.id])
            .await
            .unwrap();
        let names: Vec<&str> = fetched.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
