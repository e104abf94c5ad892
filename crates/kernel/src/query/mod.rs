//! Filter translation and query building.

pub mod filter;
pub mod query_builder;
pub mod types;

pub use filter::{FilterTriple, translate};
pub use query_builder::EntityQuery;
pub use types::{
    Filter, FilterOperator, FilterValue, QueryField, Queryable, TranslatedFilters, ValueKind,
};
