//! Join rendering and full statement composition
//!
//! Joins are declared as data (table, kind, predicate) so every statement in
//! the crate is assembled by [`compose`]. Join predicates are compile-time
//! constants of the callers and are emitted verbatim; only the joined table
//! name is escaped.

use super::builder::{build_order_by, build_select, build_where, escape_identifier};
use super::spec::QuerySpec;

/// Join kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::LeftOuter => "LEFT OUTER",
        }
    }
}

/// One declared join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub table: String,
    pub kind: JoinKind,
    /// Trusted `ON` expression, e.g. `trips.route_id=routes.route_id`
    pub predicate: String,
}

impl JoinSpec {
    pub fn new(kind: JoinKind, table: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind,
            predicate: predicate.into(),
        }
    }

    pub fn inner(table: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, table, predicate)
    }

    pub fn left_outer(table: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self::new(JoinKind::LeftOuter, table, predicate)
    }

    fn to_sql(&self) -> String {
        format!(
            "{} JOIN {} ON {}",
            self.kind.as_sql(),
            escape_identifier(&self.table),
            self.predicate
        )
    }
}

/// Render joins in declaration order, space separated
pub fn build_joins(joins: &[JoinSpec]) -> String {
    joins
        .iter()
        .map(JoinSpec::to_sql)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compose the complete statement for a query spec.
///
/// `SELECT ... FROM "table" [joins] [WHERE ...] [ORDER BY ...]`, clauses
/// separated by single spaces with empty clauses omitted.
pub fn compose(spec: &QuerySpec) -> String {
    let from = format!("FROM {}", escape_identifier(&spec.table));
    let clauses = [
        build_select(&spec.select),
        from,
        build_joins(&spec.joins),
        build_where(&spec.filter),
        build_order_by(&spec.order_by),
    ];

    clauses
        .iter()
        .filter(|clause| !clause.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::spec::{OrderSpec, SelectSpec, WhereSpec, WhereValue};

    #[test]
    fn test_build_joins_in_order() {
        let joins = vec![
            JoinSpec::inner("trips", "routes.route_id=trips.route_id"),
            JoinSpec::left_outer("stop_times", "stop_times.trip_id=trips.trip_id"),
        ];

        assert_eq!(
            build_joins(&joins),
            "INNER JOIN \"trips\" ON routes.route_id=trips.route_id \
             LEFT OUTER JOIN \"stop_times\" ON stop_times.trip_id=trips.trip_id"
        );
    }

    #[test]
    fn test_compose_minimal() {
        let spec = QuerySpec::table("agency");
        assert_eq!(compose(&spec), "SELECT * FROM \"agency\"");
    }

    #[test]
    fn test_compose_full() {
        let spec = QuerySpec::table("service_alert_targets")
            .select(SelectSpec::aliased([("alert_id", "alertId"), ("headline", "headline")]))
            .filter(WhereSpec::new().with("stop_id", WhereValue::list(["740000001"])))
            .order_by(OrderSpec::new().desc("start_time"))
            .join(
                JoinKind::Inner,
                "service_alerts",
                "service_alert_targets.alert_id=service_alerts.id",
            );

        assert_eq!(
            compose(&spec),
            "SELECT \"alert_id\" AS \"alertId\", \"headline\" AS \"headline\" \
             FROM \"service_alert_targets\" \
             INNER JOIN \"service_alerts\" ON service_alert_targets.alert_id=service_alerts.id \
             WHERE \"stop_id\" IN ('740000001') \
             ORDER BY \"start_time\" DESC"
        );
    }

    #[test]
    fn test_compose_without_joins_has_no_double_spaces() {
        let spec = QuerySpec::table("trips").filter(WhereSpec::new().with("route_id", "R1"));
        let sql = compose(&spec);

        assert!(!sql.contains("  "));
        assert_eq!(sql, "SELECT * FROM \"trips\" WHERE \"route_id\" = 'R1'");
    }
}
