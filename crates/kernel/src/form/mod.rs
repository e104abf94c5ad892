//! Wire forms.
//!
//! Request and response shapes for the JSON API, with explicit mappings to
//! and from the stored entities. Field names are camelCase on the wire;
//! dates render as `YYYY-MM-DD` and times as `HH:MM`.

pub mod conference;
pub mod profile;
pub mod session;
pub mod speaker;

pub use conference::{
    ConferenceAvailableForm, ConferenceDateRangeForm, ConferenceForm, ConferenceForms,
    ConferenceQueryForms, LocationQueryForm,
};
pub use profile::{ProfileForm, ProfileMiniForm};
pub use session::{SessionForm, SessionForms, SessionQueryForms, SpecificQueryForm};
pub use speaker::SpeakerForm;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::filter::{parse_date, parse_time};

/// A single boolean result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanMessage {
    pub data: bool,
}

/// A single string result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringMessage {
    pub data: String,
}

/// A list of forms under `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> FromIterator<T> for Items<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Parse an optional date field, rejecting values that do not parse.
fn date_field(field: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("'{field}' must be YYYY-MM-DD"))),
    }
}

/// Parse an optional `HH:MM` field, rejecting values that do not parse.
fn time_field(field: &str, raw: Option<&str>) -> AppResult<Option<NaiveTime>> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_time(raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("'{field}' must be HH:MM"))),
    }
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn format_time(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format("%H:%M").to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn message_shapes() {
        let json = serde_json::to_value(BooleanMessage { data: true }).unwrap();
        assert_eq!(json, serde_json::json!({"data": true}));

        let items: Items<i32> = [1, 2].into_iter().collect();
        assert_eq!(
            serde_json::to_value(items).unwrap(),
            serde_json::json!({"items": [1, 2]})
        );
    }

    #[test]
    fn date_fields_keep_only_the_day() {
        assert_eq!(
            date_field("startDate", Some("2026-05-01T09:00:00")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 1)
        );
        assert_eq!(date_field("startDate", Some("")).unwrap(), None);
        assert!(matches!(
            date_field("startDate", Some("May 1st")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn times_render_without_seconds() {
        let time = time_field("startTime", Some("09:30")).unwrap();
        assert_eq!(format_time(time).as_deref(), Some("09:30"));
        assert!(time_field("startTime", Some("9.30am")).is_err());
    }
}
