//! Websafe entity keys.
//!
//! Entities are identified internally by UUIDv7. The public form is an
//! opaque, URL-safe token that also carries the entity kind, so a session
//! key can never be mistaken for a conference key.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Kinds of entity that have websafe keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Conference,
    Session,
    Speaker,
}

impl EntityKind {
    fn prefix(self) -> &'static str {
        match self {
            EntityKind::Conference => "Conference",
            EntityKind::Session => "Session",
            EntityKind::Speaker => "Speaker",
        }
    }

    fn label(self) -> &'static str {
        match self {
            EntityKind::Conference => "conference",
            EntityKind::Session => "session",
            EntityKind::Speaker => "speaker",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Encode an entity id as a websafe key.
pub fn encode(kind: EntityKind, id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}:{}", kind.prefix(), id))
}

/// Decode a websafe key, returning `None` if it is malformed or of another kind.
pub fn try_decode(kind: EntityKind, key: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(key.trim()).ok()?;
    let raw = String::from_utf8(bytes).ok()?;
    let (prefix, id) = raw.split_once(':')?;
    if prefix != kind.prefix() {
        return None;
    }
    Uuid::parse_str(id).ok()
}

/// Decode a websafe key supplied by a caller.
///
/// A key that does not decode cannot resolve to a stored entity, so this
/// reports `NotFound` with the same message as a missing entity.
pub fn decode(kind: EntityKind, key: &str) -> AppResult<Uuid> {
    try_decode(kind, key).ok_or_else(|| not_found(kind, key))
}

/// The `NotFound` error for a key that does not resolve.
pub fn not_found(kind: EntityKind, key: &str) -> AppError {
    AppError::NotFound(format!("No {kind} found with key: {key}"))
}
