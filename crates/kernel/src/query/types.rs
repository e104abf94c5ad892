//! Query types shared by the filter translator, the query builder and the
//! stores that execute queries.

use std::fmt::Debug;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::key::EntityKind;

/// Comparison operators accepted in filter triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    NotEquals,
}

impl FilterOperator {
    /// Resolve a wire symbol (`EQ`, `GT`, `GTEQ`, `LT`, `LTEQ`, `NE`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "EQ" => Some(Self::Equals),
            "GT" => Some(Self::GreaterThan),
            "GTEQ" => Some(Self::GreaterOrEqual),
            "LT" => Some(Self::LessThan),
            "LTEQ" => Some(Self::LessOrEqual),
            "NE" => Some(Self::NotEquals),
            _ => None,
        }
    }

    /// Every operator except equality restricts a range.
    pub fn is_inequality(self) -> bool {
        self != Self::Equals
    }

    /// Whether `ordering` (entity value compared to filter value) satisfies
    /// this operator.
    pub fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Self::Equals => ordering == Equal,
            Self::NotEquals => ordering != Equal,
            Self::GreaterThan => ordering == Greater,
            Self::GreaterOrEqual => ordering != Less,
            Self::LessThan => ordering == Less,
            Self::LessOrEqual => ordering != Greater,
        }
    }
}

/// How a field's raw string value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Time of day, `HH:MM`.
    Time,
    /// Websafe key of the given kind.
    Key(EntityKind),
}

/// A coerced filter value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    Key(Uuid),
}

impl From<FilterValue> for sea_query::Value {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Text(s) => s.into(),
            FilterValue::Integer(i) => i.into(),
            FilterValue::Date(d) => d.into(),
            FilterValue::Time(t) => t.into(),
            FilterValue::Key(u) => u.into(),
        }
    }
}

/// A queryable field of one entity collection.
///
/// Implemented by a closed enum per collection; this is the allow-list
/// that maps wire field names onto stored attributes.
pub trait QueryField: Copy + Eq + Debug + Send + Sync + 'static {
    /// Resolve a wire field name (e.g. `MAX_ATTENDEES`).
    fn from_name(name: &str) -> Option<Self>;

    /// Stored column name.
    fn column(self) -> &'static str;

    /// Coercion applied to filter values for this field.
    fn value_kind(self) -> ValueKind;

    /// Multi-valued fields hold a list; equality means "contains".
    fn is_multi_valued(self) -> bool {
        false
    }

    /// The name field used as the default and secondary sort key.
    fn name_field() -> Self;
}

/// An entity that can be the target of a built query.
///
/// `field_values` is the explicit accessor table used by stores that
/// evaluate queries in-process.
pub trait Queryable: Clone + Send + Sync + 'static {
    type Field: QueryField;

    /// Table holding the collection.
    const TABLE: &'static str;

    /// Column holding the parent key used for ancestor scoping.
    const ANCESTOR_COLUMN: &'static str;

    /// Parent key of this entity.
    fn ancestor(&self) -> FilterValue;

    /// Primary key, the final sort tie-break.
    fn entity_id(&self) -> Uuid;

    /// Values of a field; empty when absent, several for multi-valued fields.
    fn field_values(&self, field: Self::Field) -> Vec<FilterValue>;
}

/// A validated filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<F> {
    pub field: F,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

/// Output of the filter translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedFilters<F> {
    /// The single field carrying inequality operators, if any.
    pub inequality_field: Option<F>,
    /// Validated filters in input order.
    pub filters: Vec<Filter<F>>,
}

impl<F> Default for TranslatedFilters<F> {
    fn default() -> Self {
        Self {
            inequality_field: None,
            filters: Vec::new(),
        }
    }
}
