//! Filter translation.
//!
//! Turns caller-supplied `(field, operator, value)` triples into validated,
//! typed filters for one collection. The stores can range-filter on a single
//! field per query, so every inequality in a filter set must target the
//! same field.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::types::{Filter, FilterOperator, FilterValue, QueryField, TranslatedFilters, ValueKind};
use crate::error::{AppError, AppResult};
use crate::models::key;

/// A filter triple as it arrives on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTriple {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl FilterTriple {
    pub fn new(field: &str, operator: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }
}

/// Translate filter triples for the collection whose fields are `F`.
pub fn translate<F: QueryField>(triples: &[FilterTriple]) -> AppResult<TranslatedFilters<F>> {
    let mut translated = TranslatedFilters::default();

    for triple in triples {
        let (Some(field), Some(operator)) = (
            F::from_name(&triple.field),
            FilterOperator::from_symbol(&triple.operator),
        ) else {
            return Err(AppError::InvalidFilter(
                "Filter contains invalid field or operator.".to_string(),
            ));
        };

        if field.is_multi_valued()
            && !matches!(operator, FilterOperator::Equals | FilterOperator::NotEquals)
        {
            return Err(AppError::InvalidFilter(format!(
                "{} only supports EQ and NE",
                triple.field
            )));
        }

        if operator.is_inequality() {
            match translated.inequality_field {
                Some(existing) if existing != field => {
                    return Err(AppError::UnsupportedFilterCombination(
                        "Inequality filter is allowed on only one field.".to_string(),
                    ));
                }
                Some(_) => {}
                None => translated.inequality_field = Some(field),
            }
        }

        let value = coerce(field.value_kind(), &triple.field, &triple.value)?;
        translated.filters.push(Filter {
            field,
            operator,
            value,
        });
    }

    Ok(translated)
}

/// Coerce a raw value for a field of the given kind.
pub fn coerce(kind: ValueKind, field: &str, raw: &str) -> AppResult<FilterValue> {
    let invalid = |expected: &str| {
        AppError::InvalidFilter(format!("{field} expects {expected}, got {raw:?}"))
    };

    match kind {
        ValueKind::Text => Ok(FilterValue::Text(raw.to_string())),
        ValueKind::Integer => raw
            .trim()
            .parse()
            .map(FilterValue::Integer)
            .map_err(|_| invalid("an integer")),
        ValueKind::Date => parse_date(raw)
            .map(FilterValue::Date)
            .ok_or_else(|| invalid("a date (YYYY-MM-DD)")),
        ValueKind::Time => parse_time(raw)
            .map(FilterValue::Time)
            .ok_or_else(|| invalid("a time (HH:MM)")),
        ValueKind::Key(kind) => key::try_decode(kind, raw)
            .map(FilterValue::Key)
            .ok_or_else(|| invalid(&format!("a {kind} key"))),
    }
}

/// Parse the leading `YYYY-MM-DD` of a date or datetime string.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parse an `HH:MM` time of day.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}
