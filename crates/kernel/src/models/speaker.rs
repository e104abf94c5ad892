//! Speaker model.

use uuid::Uuid;

use super::key::{self, EntityKind};

/// A speaker, referenced from sessions by key.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Speaker {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub institution: Option<String>,
    pub creator_user_id: Option<String>,
}

impl Speaker {
    pub fn websafe_key(&self) -> String {
        key::encode(EntityKind::Speaker, self.id)
    }
}
