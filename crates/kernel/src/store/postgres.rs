//! PostgreSQL entity store.

use std::collections::HashMap;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_core::Stream;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tokio_stream::StreamExt;
use tracing::debug;
use uuid::Uuid;

use super::{EntityStore, EntityStream};
use crate::error::{AppError, AppResult};
use crate::models::key::{self, EntityKind};
use crate::models::{Conference, ConferenceField, Profile, Session, SessionField, Speaker};
use crate::query::EntityQuery;
use crate::services::registration::{RegistrationOp, apply_registration};
use crate::services::wishlist::{WishlistOp, apply_wishlist};

/// Entity store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Stream rows of `sql` without buffering the result set.
fn fetch_rows<T>(pool: PgPool, sql: String) -> impl Stream<Item = AppResult<T>> + Send
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    try_stream! {
        debug!(sql = %sql, "executing entity query");
        let mut rows = sqlx::query_as::<_, T>(&sql).fetch(&pool);
        while let Some(row) = rows.next().await {
            yield row?;
        }
    }
}

/// Reorder fetched rows to match `ids`, dropping ids that were not found.
fn in_id_order<T>(ids: &[Uuid], rows: Vec<T>, id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut by_id: HashMap<Uuid, T> = rows.into_iter().map(|row| (id_of(&row), row)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[async_trait]
impl EntityStore for PgStore {
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profile WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn put_profile(&self, profile: &Profile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profile (user_id, display_name, main_email, tee_shirt_size,
                                 conference_keys_to_attend, sessions_wishlist)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                main_email = EXCLUDED.main_email,
                tee_shirt_size = EXCLUDED.tee_shirt_size,
                conference_keys_to_attend = EXCLUDED.conference_keys_to_attend,
                sessions_wishlist = EXCLUDED.sessions_wishlist
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.display_name)
        .bind(&profile.main_email)
        .bind(profile.tee_shirt_size.as_str())
        .bind(&profile.conference_keys_to_attend)
        .bind(&profile.sessions_wishlist)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ensure_profile(&self, profile: &Profile) -> AppResult<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profile (user_id, display_name, main_email, tee_shirt_size,
                                 conference_keys_to_attend, sessions_wishlist)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.display_name)
        .bind(&profile.main_email)
        .bind(profile.tee_shirt_size.as_str())
        .bind(&profile.conference_keys_to_attend)
        .bind(&profile.sessions_wishlist)
        .execute(&self.pool)
        .await?;

        let stored = sqlx::query_as::<_, Profile>("SELECT * FROM profile WHERE user_id = $1")
            .bind(&profile.user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn insert_conference(&self, conference: &Conference) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conference (id, name, description, organizer_user_id, topics, city,
                                    start_date, month, end_date, max_attendees, seats_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(conference.id)
        .bind(&conference.name)
        .bind(&conference.description)
        .bind(&conference.organizer_user_id)
        .bind(&conference.topics)
        .bind(&conference.city)
        .bind(conference.start_date)
        .bind(conference.month)
        .bind(conference.end_date)
        .bind(conference.max_attendees)
        .bind(conference.seats_available)
        .execute(&self.pool)
        .await?;

        debug!(conference_id = %conference.id, "conference inserted");
        Ok(())
    }

    async fn get_conference(&self, id: Uuid) -> AppResult<Option<Conference>> {
        let conference = sqlx::query_as::<_, Conference>("SELECT * FROM conference WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conference)
    }

    async fn get_conferences(&self, ids: &[Uuid]) -> AppResult<Vec<Conference>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Conference>("SELECT * FROM conference WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(in_id_order(ids, rows, |c| c.id))
    }

    fn query_conferences(&self, query: EntityQuery<ConferenceField>) -> EntityStream<Conference> {
        Box::pin(fetch_rows(self.pool.clone(), query.to_sql::<Conference>()))
    }

    async fn insert_session(&self, session: &Session) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session (id, conference_id, name, speaker_id, highlights, duration,
                                 type_of_session, date, start_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id)
        .bind(session.conference_id)
        .bind(&session.name)
        .bind(session.speaker_id)
        .bind(&session.highlights)
        .bind(session.duration)
        .bind(&session.type_of_session)
        .bind(session.date)
        .bind(session.start_time)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, "session inserted");
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM session WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    async fn get_sessions(&self, ids: &[Uuid]) -> AppResult<Vec<Session>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Session>("SELECT * FROM session WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(in_id_order(ids, rows, |s| s.id))
    }

    fn query_sessions(&self, query: EntityQuery<SessionField>) -> EntityStream<Session> {
        Box::pin(fetch_rows(self.pool.clone(), query.to_sql::<Session>()))
    }

    async fn insert_speaker(&self, speaker: &Speaker) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO speaker (id, name, email, institution, creator_user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(speaker.id)
        .bind(&speaker.name)
        .bind(&speaker.email)
        .bind(&speaker.institution)
        .bind(&speaker.creator_user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_speaker(&self, id: Uuid) -> AppResult<Option<Speaker>> {
        let speaker = sqlx::query_as::<_, Speaker>("SELECT * FROM speaker WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(speaker)
    }

    async fn update_registration(
        &self,
        user_id: &str,
        conference_id: Uuid,
        op: RegistrationOp,
    ) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Profile first, then conference: every registration takes the
        // locks in the same order.
        let mut profile =
            sqlx::query_as::<_, Profile>("SELECT * FROM profile WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("No profile found for user: {user_id}"))
                })?;

        let mut conference =
            sqlx::query_as::<_, Conference>("SELECT * FROM conference WHERE id = $1 FOR UPDATE")
                .bind(conference_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    key::not_found(
                        EntityKind::Conference,
                        &key::encode(EntityKind::Conference, conference_id),
                    )
                })?;

        // An error here drops the transaction, which rolls it back.
        let changed = apply_registration(&mut profile, &mut conference, op)?;

        if changed {
            sqlx::query("UPDATE profile SET conference_keys_to_attend = $2 WHERE user_id = $1")
                .bind(&profile.user_id)
                .bind(&profile.conference_keys_to_attend)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE conference SET seats_available = $2 WHERE id = $1")
                .bind(conference.id)
                .bind(conference.seats_available)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(
            user_id = %user_id,
            conference_id = %conference_id,
            op = op.as_str(),
            changed,
            seats_available = conference.seats_available,
            "registration committed"
        );
        Ok(changed)
    }

    async fn update_wishlist(
        &self,
        user_id: &str,
        session_key: &str,
        op: WishlistOp,
    ) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let mut profile =
            sqlx::query_as::<_, Profile>("SELECT * FROM profile WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("No profile found for user: {user_id}"))
                })?;

        let changed = apply_wishlist(&mut profile, session_key, op)?;

        if changed {
            sqlx::query("UPDATE profile SET sessions_wishlist = $2 WHERE user_id = $1")
                .bind(&profile.user_id)
                .bind(&profile.sessions_wishlist)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(changed)
    }

    async fn check_health(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore").finish()
    }
}
