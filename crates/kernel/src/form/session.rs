//! Session forms.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Items, date_field, format_date, format_time, time_field};
use crate::error::{AppError, AppResult};
use crate::models::Session;
use crate::models::key::{self, EntityKind};
use crate::query::FilterTriple;

/// A session as sent and received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conference_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_key: Option<String>,
    pub highlights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
}

pub type SessionForms = Items<SessionForm>;

impl SessionForm {
    pub fn from_session(session: &Session, speaker_name: Option<&str>) -> Self {
        Self {
            name: Some(session.name.clone()),
            conference_key: Some(session.conference_key()),
            speaker_key: session.speaker_key(),
            highlights: session.highlights.clone(),
            duration: session.duration,
            type_of_session: session.type_of_session.clone(),
            date: format_date(session.date),
            start_time: format_time(session.start_time),
            speaker_name: speaker_name.map(str::to_string),
            websafe_key: Some(session.websafe_key()),
        }
    }

    /// Build a new session in `conference_id`.
    ///
    /// A speaker key that does not decode is reported as `NotFound`; whether
    /// the speaker exists is the caller's check.
    pub fn into_new_session(self, conference_id: Uuid) -> AppResult<Session> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("Session 'name' field required".to_string()))?;

        let speaker_id = match self.speaker_key.as_deref().filter(|k| !k.is_empty()) {
            Some(speaker_key) => Some(key::decode(EntityKind::Speaker, speaker_key)?),
            None => None,
        };

        Ok(Session {
            id: Uuid::now_v7(),
            conference_id,
            name,
            speaker_id,
            highlights: self.highlights,
            duration: self.duration,
            type_of_session: self.type_of_session.filter(|t| !t.is_empty()),
            date: date_field("date", self.date.as_deref())?,
            start_time: time_field("startTime", self.start_time.as_deref())?,
        })
    }
}

/// Filter triples for a session query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionQueryForms {
    pub filters: Vec<FilterTriple>,
}

/// A single comparison against a fixed field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificQueryForm {
    pub operator: String,
    pub value: String,
}

impl SpecificQueryForm {
    pub fn to_filter(&self, field: &str) -> FilterTriple {
        FilterTriple::new(field, &self.operator, &self.value)
    }
}
