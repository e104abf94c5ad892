//! Conference model.

use chrono::NaiveDate;
use uuid::Uuid;

use super::key::{self, EntityKind};
use crate::query::{FilterValue, QueryField, Queryable, ValueKind};

/// A conference, parented by its organizer's profile.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Conference {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organizer_user_id: String,
    pub topics: Vec<String>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Month of `start_date`, 0 when there is none.
    pub month: i32,
    pub end_date: Option<NaiveDate>,
    pub max_attendees: i32,
    pub seats_available: i32,
}

impl Conference {
    pub fn websafe_key(&self) -> String {
        key::encode(EntityKind::Conference, self.id)
    }
}

/// Queryable conference fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConferenceField {
    Name,
    City,
    Topic,
    Month,
    MaxAttendees,
    SeatsAvailable,
    StartDate,
}

impl QueryField for ConferenceField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "NAME" => Some(Self::Name),
            "CITY" => Some(Self::City),
            "TOPIC" => Some(Self::Topic),
            "MONTH" => Some(Self::Month),
            "MAX_ATTENDEES" => Some(Self::MaxAttendees),
            "SEATS_AVAILABLE" => Some(Self::SeatsAvailable),
            "START_DATE" => Some(Self::StartDate),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::Topic => "topics",
            Self::Month => "month",
            Self::MaxAttendees => "max_attendees",
            Self::SeatsAvailable => "seats_available",
            Self::StartDate => "start_date",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            Self::Name | Self::City | Self::Topic => ValueKind::Text,
            Self::Month | Self::MaxAttendees | Self::SeatsAvailable => ValueKind::Integer,
            Self::StartDate => ValueKind::Date,
        }
    }

    fn is_multi_valued(self) -> bool {
        self == Self::Topic
    }

    fn name_field() -> Self {
        Self::Name
    }
}

impl Queryable for Conference {
    type Field = ConferenceField;

    const TABLE: &'static str = "conference";
    const ANCESTOR_COLUMN: &'static str = "organizer_user_id";

    fn ancestor(&self) -> FilterValue {
        FilterValue::Text(self.organizer_user_id.clone())
    }

    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn field_values(&self, field: ConferenceField) -> Vec<FilterValue> {
        match field {
            ConferenceField::Name => vec![FilterValue::Text(self.name.clone())],
            ConferenceField::City => self.city.clone().map(FilterValue::Text).into_iter().collect(),
            ConferenceField::Topic => self.topics.iter().cloned().map(FilterValue::Text).collect(),
            ConferenceField::Month => vec![FilterValue::Integer(i64::from(self.month))],
            ConferenceField::MaxAttendees => {
                vec![FilterValue::Integer(i64::from(self.max_attendees))]
            }
            ConferenceField::SeatsAvailable => {
                vec![FilterValue::Integer(i64::from(self.seats_available))]
            }
            ConferenceField::StartDate => {
                self.start_date.map(FilterValue::Date).into_iter().collect()
            }
        }
    }
}
