//! # Query Executor
//!
//! Runs composed statements against a dataset handle. The only entry point
//! takes a [`QuerySpec`], so no caller can hand raw SQL to the store.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::errors::{QueryError, QueryResult};
use super::join::compose;
use super::spec::QuerySpec;
use crate::dataset::DatasetHandle;

/// One result row, keyed by result column name (the alias when aliased)
pub type Row = Map<String, Value>;

/// Executes query specs
pub struct QueryExecutor;

impl QueryExecutor {
    /// Compose `spec`, run it against `handle` and return every row.
    ///
    /// Either all rows are returned or a single error carrying the statement.
    pub fn advanced_query(handle: &DatasetHandle, spec: &QuerySpec) -> QueryResult<Vec<Row>> {
        let statement = compose(spec);
        debug!(provider = handle.provider(), %statement, "executing query");

        handle.with_connection(|conn| fetch_all(conn, &statement))?
    }
}

fn fetch_all(conn: &Connection, statement: &str) -> QueryResult<Vec<Row>> {
    let mut prepared = conn
        .prepare(statement)
        .map_err(|e| QueryError::statement(statement, e))?;

    let columns: Vec<String> = prepared
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = prepared
        .query([])
        .map_err(|e| QueryError::statement(statement, e))?;

    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(|e| QueryError::statement(statement, e))? {
        let mut object = Map::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            let value = row
                .get_ref(index)
                .map_err(|e| QueryError::statement(statement, e))?;
            object.insert(column.clone(), to_json(value));
        }
        result.push(object);
    }

    Ok(result)
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::join::JoinKind;
    use crate::query::spec::{OrderSpec, SelectSpec, WhereSpec, WhereValue};
    use std::time::Duration;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, DatasetHandle) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sl.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE routes (route_id TEXT, route_short_name TEXT, agency_id TEXT);
                 CREATE TABLE trips (trip_id TEXT, route_id TEXT);
                 CREATE TABLE stops (stop_id TEXT, stop_name TEXT, stop_lat REAL, parent_station TEXT);
                 INSERT INTO routes VALUES ('R1', '4', 'SL'), ('R2', '17', 'SL');
                 INSERT INTO trips VALUES ('T1', 'R1'), ('T2', 'R1'), ('T3', 'R2');
                 INSERT INTO stops VALUES ('S1', 'Odenplan', 59.343, NULL),
                                          ('S2', 'Odenplan', 59.343, 'S1'),
                                          ('S3', 'Slussen', 59.319, NULL);",
            )
            .unwrap();
        }
        let handle = DatasetHandle::open("sl", &path, Duration::from_millis(500)).unwrap();
        (tmp, handle)
    }

    #[test]
    fn test_rows_keyed_by_alias_in_select_order() {
        let (_tmp, handle) = fixture();
        let spec = QuerySpec::table("stops")
            .select(SelectSpec::aliased([("stop_name", "name"), ("stop_id", "stopId"), ("stop_lat", "lat")]))
            .filter(WhereSpec::new().with_null("parent_station"))
            .order_by(OrderSpec::new().asc("stop_id"));

        let rows = QueryExecutor::advanced_query(&handle, &spec).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["name", "stopId", "lat"]);
        assert_eq!(rows[0]["stopId"], "S1");
        assert_eq!(rows[0]["lat"], 59.343);
        assert_eq!(rows[1]["name"], "Slussen");
    }

    #[test]
    fn test_join_query() {
        let (_tmp, handle) = fixture();
        let spec = QuerySpec::table("routes")
            .select(SelectSpec::aliased([("routes.route_id", "routeId"), ("trips.trip_id", "tripId")]))
            .join(JoinKind::Inner, "trips", "routes.route_id=trips.route_id")
            .filter(WhereSpec::new().with("routes.route_id", WhereValue::list(["R1"])))
            .order_by(OrderSpec::new().desc("trips.trip_id"));

        let rows = QueryExecutor::advanced_query(&handle, &spec).unwrap();

        let trips: Vec<_> = rows.iter().map(|r| r["tripId"].as_str().unwrap()).collect();
        assert_eq!(trips, vec!["T2", "T1"]);
    }

    #[test]
    fn test_unknown_table_reports_statement() {
        let (_tmp, handle) = fixture();
        let spec = QuerySpec::table("no_such_table");

        match QueryExecutor::advanced_query(&handle, &spec) {
            Err(QueryError::Statement { statement, message }) => {
                assert_eq!(statement, "SELECT * FROM \"no_such_table\"");
                assert!(message.contains("no_such_table"));
            }
            other => panic!("expected statement error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_join_predicate_is_an_error() {
        let (_tmp, handle) = fixture();
        let spec = QuerySpec::table("routes").join(JoinKind::LeftOuter, "trips", "routes.route_id ==");

        assert!(matches!(
            QueryExecutor::advanced_query(&handle, &spec),
            Err(QueryError::Statement { .. })
        ));
    }

    #[test]
    fn test_injection_attempt_matches_nothing() {
        let (_tmp, handle) = fixture();
        let spec = QuerySpec::table("stops").filter(WhereSpec::new().with("stop_name", "x' OR '1'='1"));

        let rows = QueryExecutor::advanced_query(&handle, &spec).unwrap();
        assert!(rows.is_empty());
    }
}
