//! Conference forms.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Items, date_field, format_date};
use crate::error::{AppError, AppResult};
use crate::models::Conference;
use crate::query::FilterTriple;

const DEFAULT_CITY: &str = "Default City";
const DEFAULT_TOPICS: [&str; 2] = ["Default", "Topic"];

/// A conference as sent and received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_user_id: Option<String>,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_available: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_display_name: Option<String>,
}

pub type ConferenceForms = Items<ConferenceForm>;

impl ConferenceForm {
    /// Render a stored conference. `organizer_display_name` is included
    /// when the caller looked it up.
    pub fn from_conference(conference: &Conference, organizer_display_name: Option<&str>) -> Self {
        Self {
            name: Some(conference.name.clone()),
            description: conference.description.clone(),
            organizer_user_id: Some(conference.organizer_user_id.clone()),
            topics: conference.topics.clone(),
            city: conference.city.clone(),
            start_date: format_date(conference.start_date),
            month: Some(conference.month),
            max_attendees: Some(conference.max_attendees),
            seats_available: Some(conference.seats_available),
            end_date: format_date(conference.end_date),
            websafe_key: Some(conference.websafe_key()),
            organizer_display_name: organizer_display_name
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }

    /// Build a new conference organized by `organizer_user_id`.
    ///
    /// Missing city and topics get defaults, `month` follows the start
    /// date (0 without one), and all seats start out available.
    /// `websafeKey`, `organizerDisplayName` and any supplied seat count are
    /// ignored.
    pub fn into_new_conference(self, organizer_user_id: &str) -> AppResult<Conference> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("Conference 'name' field required".to_string()))?;

        let start_date = date_field("startDate", self.start_date.as_deref())?;
        let end_date = date_field("endDate", self.end_date.as_deref())?;

        let topics = if self.topics.is_empty() {
            DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
        } else {
            self.topics
        };

        let max_attendees = self.max_attendees.unwrap_or(0).max(0);

        Ok(Conference {
            id: Uuid::now_v7(),
            name,
            description: self.description,
            organizer_user_id: organizer_user_id.to_string(),
            topics,
            city: Some(
                self.city
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_CITY.to_string()),
            ),
            start_date,
            month: start_date.map_or(0, |d| d.month() as i32),
            end_date,
            max_attendees,
            seats_available: max_attendees,
        })
    }
}

/// Filter triples for a conference query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceQueryForms {
    pub filters: Vec<FilterTriple>,
}

/// Conferences starting within a date range. Either bound may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceDateRangeForm {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ConferenceDateRangeForm {
    pub fn to_filters(&self) -> Vec<FilterTriple> {
        let mut filters = Vec::new();
        if let Some(start) = self.start_date.as_deref().filter(|s| !s.is_empty()) {
            filters.push(FilterTriple::new("START_DATE", "GTEQ", start));
        }
        if let Some(end) = self.end_date.as_deref().filter(|s| !s.is_empty()) {
            filters.push(FilterTriple::new("START_DATE", "LTEQ", end));
        }
        filters
    }
}

/// Conferences in a month that still have seats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceAvailableForm {
    pub month: Option<i32>,
}

impl ConferenceAvailableForm {
    pub fn to_filters(&self) -> Vec<FilterTriple> {
        let mut filters = Vec::new();
        if let Some(month) = self.month {
            filters.push(FilterTriple::new("MONTH", "EQ", &month.to_string()));
        }
        filters.push(FilterTriple::new("SEATS_AVAILABLE", "GT", "0"));
        filters
    }
}

/// Conferences in a city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationQueryForm {
    pub city: String,
}

impl LocationQueryForm {
    pub fn to_filters(&self) -> Vec<FilterTriple> {
        vec![FilterTriple::new("CITY", "EQ", &self.city)]
    }
}
