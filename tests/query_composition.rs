//! Query Composition Tests
//!
//! Declarative specs rendered into SQLite statements and run against a
//! GTFS-shaped dataset:
//! - list values render as `IN (...)`, nulls as `IS NULL`
//! - joins render in declaration order with verbatim predicates
//! - rows come back keyed by alias, in select order

mod common;

use timetable_api::query::{
    build_where, compose, JoinKind, OrderSpec, QueryError, QueryExecutor, QuerySpec, SelectSpec,
    SqlValue, WhereSpec, WhereValue,
};

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_list_and_null_where() {
    let filter = WhereSpec::new()
        .with("stop_id", WhereValue::list(["A", "B"]))
        .with_null("agency_id");

    assert_eq!(
        build_where(&filter),
        r#"WHERE "stop_id" IN ('A', 'B') AND "agency_id" IS NULL"#
    );
}

#[test]
fn test_scalar_null_never_renders_equals() {
    let filter = WhereSpec::new().with("parent_station", SqlValue::Null);
    let rendered = build_where(&filter);

    assert_eq!(rendered, r#"WHERE "parent_station" IS NULL"#);
    assert!(!rendered.contains("= NULL"));
}

#[test]
fn test_full_statement_shape() {
    let spec = QuerySpec::table("service_alert_targets")
        .select(SelectSpec::aliased([("alert_id", "alertId"), ("headline", "headline")]))
        .join(JoinKind::Inner, "service_alerts", "service_alert_targets.alert_id=service_alerts.id")
        .filter(WhereSpec::new().with("stop_id", "S1"))
        .order_by(OrderSpec::new().desc("start_time"));

    assert_eq!(
        compose(&spec),
        concat!(
            r#"SELECT "alert_id" AS "alertId", "headline" AS "headline" "#,
            r#"FROM "service_alert_targets" "#,
            r#"INNER JOIN "service_alerts" ON service_alert_targets.alert_id=service_alerts.id "#,
            r#"WHERE "stop_id" = 'S1' "#,
            r#"ORDER BY "start_time" DESC"#
        )
    );
}

#[test]
fn test_bare_table_selects_everything() {
    assert_eq!(compose(&QuerySpec::table("trips")), r#"SELECT * FROM "trips""#);
}

// =============================================================================
// Execution
// =============================================================================

#[test]
fn test_departure_style_query_against_dataset() {
    let (_tmp, handle) = common::gtfs_fixture("sl");

    let spec = QuerySpec::table("stop_times")
        .select(SelectSpec::aliased([
            ("stop_times.departure_time", "departureTime"),
            ("trips.trip_id", "tripId"),
            ("attributions.organization_name", "operator"),
            ("stop_times_updates.departure_delay", "departureDelay"),
        ]))
        .join(JoinKind::LeftOuter, "attributions", "stop_times.trip_id=attributions.trip_id")
        .join(JoinKind::LeftOuter, "trips", "stop_times.trip_id=trips.trip_id")
        .join(
            JoinKind::LeftOuter,
            "stop_times_updates",
            "stop_times.stop_id=stop_times_updates.stop_id AND stop_times.trip_id=stop_times_updates.trip_id",
        )
        .filter(WhereSpec::new().with("stop_times.stop_id", WhereValue::list(["S1", "S1A"])))
        .order_by(OrderSpec::new().asc("stop_times.departure_time"));

    let rows = QueryExecutor::advanced_query(&handle, &spec).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].keys().collect::<Vec<_>>(),
        vec!["departureTime", "tripId", "operator", "departureDelay"]
    );
    assert_eq!(rows[0]["tripId"], "T1");
    assert_eq!(rows[0]["operator"], "Keolis");
    assert_eq!(rows[0]["departureDelay"], 90);
    assert_eq!(rows[1]["tripId"], "T2");
    assert!(rows[1]["operator"].is_null());
}

#[test]
fn test_hostile_literal_is_data() {
    let (_tmp, handle) = common::gtfs_fixture("sl");

    let spec = QuerySpec::table("stops").filter(
        WhereSpec::new().with("stop_name", "Odenplan'; DROP TABLE stops; --"),
    );
    assert!(QueryExecutor::advanced_query(&handle, &spec).unwrap().is_empty());

    let still_there = QueryExecutor::advanced_query(&handle, &QuerySpec::table("stops")).unwrap();
    assert_eq!(still_there.len(), 3);
}

#[test]
fn test_storage_error_is_reported_with_statement() {
    let (_tmp, handle) = common::gtfs_fixture("sl");
    let spec = QuerySpec::table("stops").select(SelectSpec::fields(["no_such_column"]));

    match QueryExecutor::advanced_query(&handle, &spec) {
        Err(QueryError::Statement { statement, .. }) => {
            assert_eq!(statement, r#"SELECT "no_such_column" FROM "stops""#);
        }
        other => panic!("expected statement error, got {:?}", other),
    }
}
