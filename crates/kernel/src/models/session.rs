//! Conference session model.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::key::{self, EntityKind};
use crate::query::{FilterValue, QueryField, Queryable, ValueKind};

/// A session, parented by its conference.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub conference_id: Uuid,
    pub name: String,
    pub speaker_id: Option<Uuid>,
    pub highlights: Vec<String>,
    /// Length in minutes.
    pub duration: Option<i32>,
    pub type_of_session: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
}

impl Session {
    pub fn websafe_key(&self) -> String {
        key::encode(EntityKind::Session, self.id)
    }

    pub fn conference_key(&self) -> String {
        key::encode(EntityKind::Conference, self.conference_id)
    }

    pub fn speaker_key(&self) -> Option<String> {
        self.speaker_id
            .map(|id| key::encode(EntityKind::Speaker, id))
    }
}

/// Queryable session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    Name,
    TypeOfSession,
    Duration,
    Date,
    StartTime,
    Speaker,
    Highlights,
}

impl QueryField for SessionField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "NAME" => Some(Self::Name),
            "TYPE_OF_SESSION" => Some(Self::TypeOfSession),
            "DURATION" => Some(Self::Duration),
            "DATE" => Some(Self::Date),
            "START_TIME" => Some(Self::StartTime),
            "SPEAKER" => Some(Self::Speaker),
            "HIGHLIGHTS" => Some(Self::Highlights),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::TypeOfSession => "type_of_session",
            Self::Duration => "duration",
            Self::Date => "date",
            Self::StartTime => "start_time",
            Self::Speaker => "speaker_id",
            Self::Highlights => "highlights",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            Self::Name | Self::TypeOfSession | Self::Highlights => ValueKind::Text,
            Self::Duration => ValueKind::Integer,
            Self::Date => ValueKind::Date,
            Self::StartTime => ValueKind::Time,
            Self::Speaker => ValueKind::Key(EntityKind::Speaker),
        }
    }

    fn is_multi_valued(self) -> bool {
        self == Self::Highlights
    }

    fn name_field() -> Self {
        Self::Name
    }
}

impl Queryable for Session {
    type Field = SessionField;

    const TABLE: &'static str = "session";
    const ANCESTOR_COLUMN: &'static str = "conference_id";

    fn ancestor(&self) -> FilterValue {
        FilterValue::Key(self.conference_id)
    }

    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn field_values(&self, field: SessionField) -> Vec<FilterValue> {
        match field {
            SessionField::Name => vec![FilterValue::Text(self.name.clone())],
            SessionField::TypeOfSession => self
                .type_of_session
                .clone()
                .map(FilterValue::Text)
                .into_iter()
                .collect(),
            SessionField::Duration => self
                .duration
                .map(|d| FilterValue::Integer(i64::from(d)))
                .into_iter()
                .collect(),
            SessionField::Date => self.date.map(FilterValue::Date).into_iter().collect(),
            SessionField::StartTime => self.start_time.map(FilterValue::Time).into_iter().collect(),
            SessionField::Speaker => self.speaker_id.map(FilterValue::Key).into_iter().collect(),
            SessionField::Highlights => self
                .highlights
                .iter()
                .cloned()
                .map(FilterValue::Text)
                .collect(),
        }
    }
}
