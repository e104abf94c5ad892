//! Entity query builder.
//!
//! Composes translated filters, an optional ancestor scope and the ordering
//! rules into an [`EntityQuery`]. The query is a plain value: stores execute
//! it as many times as they are asked to, either by rendering it to SQL with
//! SeaQuery or by evaluating it against entities in memory.

use std::cmp::Ordering;

use sea_query::{
    Alias, Asterisk, Expr, Order, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr,
};

use super::types::{Filter, FilterOperator, FilterValue, QueryField, Queryable, TranslatedFilters};

/// An ordered, conjunctive query over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQuery<F> {
    ancestor: Option<FilterValue>,
    filters: Vec<Filter<F>>,
    order: Vec<F>,
}

impl<F: QueryField> EntityQuery<F> {
    /// Build a query from translator output.
    ///
    /// With an inequality field the results sort by that field first and by
    /// name second; otherwise by name alone.
    pub fn new(ancestor: Option<FilterValue>, translated: TranslatedFilters<F>) -> Self {
        let name = F::name_field();
        let order = match translated.inequality_field {
            Some(field) if field != name => vec![field, name],
            _ => vec![name],
        };

        Self {
            ancestor,
            filters: translated.filters,
            order,
        }
    }

    /// Every entity of the collection, sorted by name.
    pub fn all() -> Self {
        Self::new(None, TranslatedFilters::default())
    }

    /// Every entity under one parent, sorted by name.
    pub fn children_of(ancestor: FilterValue) -> Self {
        Self::new(Some(ancestor), TranslatedFilters::default())
    }

    pub fn ancestor(&self) -> Option<&FilterValue> {
        self.ancestor.as_ref()
    }

    pub fn filters(&self) -> &[Filter<F>] {
        &self.filters
    }

    /// Sort keys, most significant first.
    pub fn order(&self) -> &[F] {
        &self.order
    }

    /// Render as a SeaQuery SELECT over `E`'s table.
    pub fn select<E>(&self) -> SelectStatement
    where
        E: Queryable<Field = F>,
    {
        let mut query = Query::select();
        query
            .column((Alias::new(E::TABLE), Asterisk))
            .from(Alias::new(E::TABLE));

        if let Some(ancestor) = &self.ancestor {
            query.and_where(
                Expr::col((Alias::new(E::TABLE), Alias::new(E::ANCESTOR_COLUMN)))
                    .eq(sea_query::Value::from(ancestor.clone())),
            );
        }

        for filter in &self.filters {
            query.and_where(filter_condition::<E>(filter));
        }

        for field in &self.order {
            query.order_by((Alias::new(E::TABLE), Alias::new(field.column())), Order::Asc);
        }
        // Stable tie-break so repeated executions agree.
        query.order_by((Alias::new(E::TABLE), Alias::new("id")), Order::Asc);

        query
    }

    /// Render as Postgres SQL with values inlined.
    pub fn to_sql<E>(&self) -> String
    where
        E: Queryable<Field = F>,
    {
        self.select::<E>().to_string(PostgresQueryBuilder)
    }

    /// Whether `entity` satisfies the ancestor scope and every filter.
    pub fn matches<E>(&self, entity: &E) -> bool
    where
        E: Queryable<Field = F>,
    {
        if let Some(ancestor) = &self.ancestor
            && entity.ancestor() != *ancestor
        {
            return false;
        }

        self.filters
            .iter()
            .all(|filter| filter_matches(filter, &entity.field_values(filter.field)))
    }

    /// Result ordering between two entities, matching the SQL rendering:
    /// ascending, absent values last, id as the final tie-break.
    pub fn compare<E>(&self, a: &E, b: &E) -> Ordering
    where
        E: Queryable<Field = F>,
    {
        for field in &self.order {
            let ordering = compare_values(&a.field_values(*field), &b.field_values(*field));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.entity_id().cmp(&b.entity_id())
    }
}

fn filter_condition<E: Queryable>(filter: &Filter<E::Field>) -> SimpleExpr {
    let value = sea_query::Value::from(filter.value.clone());

    if filter.field.is_multi_valued() {
        let array = format!("\"{}\".\"{}\"", E::TABLE, filter.field.column());
        // The translator only lets EQ and NE through for list fields.
        return match filter.operator {
            FilterOperator::NotEquals => {
                Expr::cust_with_values(format!("NOT ($1 = ANY({array}))"), [value])
            }
            _ => Expr::cust_with_values(format!("$1 = ANY({array})"), [value]),
        };
    }

    let column = Expr::col((Alias::new(E::TABLE), Alias::new(filter.field.column())));
    match filter.operator {
        FilterOperator::Equals => column.eq(value),
        FilterOperator::NotEquals => column.ne(value),
        FilterOperator::GreaterThan => column.gt(value),
        FilterOperator::GreaterOrEqual => column.gte(value),
        FilterOperator::LessThan => column.lt(value),
        FilterOperator::LessOrEqual => column.lte(value),
    }
}

fn filter_matches<F: QueryField>(filter: &Filter<F>, values: &[FilterValue]) -> bool {
    if filter.field.is_multi_valued() {
        let contains = values.contains(&filter.value);
        return match filter.operator {
            FilterOperator::Equals => contains,
            FilterOperator::NotEquals => !contains,
            _ => false,
        };
    }

    // Absent values never satisfy a comparison, as with SQL NULL.
    values
        .first()
        .is_some_and(|value| filter.operator.accepts(value.cmp(&filter.value)))
}

fn compare_values(a: &[FilterValue], b: &[FilterValue]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}
