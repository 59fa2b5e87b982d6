//! # Transit Service
//!
//! The read operations of the public API over one provider's dataset. Each
//! operation is a [`QuerySpec`] with the public field names as aliases;
//! nothing here writes SQL.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use super::departures::{default_window, upcoming};
use super::errors::{TransitError, TransitResult};
use crate::dataset::DatasetHandle;
use crate::query::{
    JoinKind, OrderSpec, QueryExecutor, QuerySpec, Row, SelectSpec, WhereSpec, WhereValue,
};

/// How a caller names a stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopRef {
    Id(String),
    Name(String),
}

impl StopRef {
    fn filter(&self) -> WhereSpec {
        match self {
            StopRef::Id(id) => WhereSpec::new().with("stop_id", id.as_str()),
            StopRef::Name(name) => WhereSpec::new().with("stop_name", name.as_str()),
        }
    }
}

/// Filters of the stops listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Include platforms and other stops with a parent station
    pub include_children: bool,
}

/// Read operations over one provider's dataset
pub struct TransitService {
    handle: Arc<DatasetHandle>,
}

impl TransitService {
    pub fn new(handle: Arc<DatasetHandle>) -> Self {
        Self { handle }
    }

    pub fn provider(&self) -> &str {
        self.handle.provider()
    }

    fn run(&self, spec: &QuerySpec) -> TransitResult<Vec<Row>> {
        Ok(QueryExecutor::advanced_query(&self.handle, spec)?)
    }

    /// Feed metadata
    pub fn feed_info(&self) -> TransitResult<Vec<Row>> {
        let spec = QuerySpec::table("feed_info").select(SelectSpec::aliased([
            ("id", "feedId"),
            ("feed_publisher_name", "publisher"),
            ("feed_publisher_url", "url"),
            ("feed_lang", "language"),
            ("feed_version", "version"),
        ]));

        self.run(&spec)
    }

    /// Agencies, optionally narrowed by id and/or name
    pub fn agencies(&self, id: Option<&str>, name: Option<&str>) -> TransitResult<Vec<Row>> {
        let mut filter = WhereSpec::new();
        if let Some(id) = id {
            filter.insert("agency_id", id);
        }
        if let Some(name) = name {
            filter.insert("agency_name", name);
        }

        let spec = QuerySpec::table("agency")
            .select(SelectSpec::aliased([
                ("agency_id", "agencyId"),
                ("agency_name", "name"),
                ("agency_url", "url"),
                ("agency_fare_url", "fareUrl"),
            ]))
            .filter(filter);

        self.run(&spec)
    }

    /// Ids of every stop matching `stop`
    pub fn resolve_stop_ids(&self, stop: &StopRef) -> TransitResult<Vec<String>> {
        let spec = QuerySpec::table("stops")
            .select(SelectSpec::fields(["stop_id"]))
            .filter(stop.filter());

        let ids: Vec<String> = self
            .run(&spec)?
            .into_iter()
            .filter_map(|mut row| match row.remove("stop_id") {
                Some(Value::String(id)) => Some(id),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .collect();

        if ids.is_empty() {
            return Err(TransitError::StopNotFound);
        }
        Ok(ids)
    }

    /// Departures from `stop` within the next hour after `now`, earliest
    /// first, with real-time delays where known
    pub fn departures(&self, stop: &StopRef, now: NaiveDateTime) -> TransitResult<Vec<Row>> {
        let stop_ids = self.resolve_stop_ids(stop)?;

        let spec = QuerySpec::table("stop_times")
            .select(SelectSpec::aliased([
                ("routes.route_short_name", "routeName"),
                ("stop_times.stop_headsign", "destination"),
                ("stop_times.arrival_time", "arrivalTime"),
                ("stop_times.departure_time", "departureTime"),
                ("trips.direction_id", "direction"),
                ("trips.trip_id", "tripId"),
                ("attributions.organization_name", "operator"),
                ("agency.agency_name", "organizer"),
                ("agency.agency_id", "agencyId"),
                ("routes.route_desc", "routeNotes"),
                ("routes.route_type", "routeType"),
                ("routes.route_id", "routeId"),
                ("stops.stop_name", "stop"),
                ("stops.stop_id", "stopId"),
                ("stop_times_updates.arrival_delay", "arrivalDelay"),
                ("stop_times_updates.departure_delay", "departureDelay"),
            ]))
            .join(JoinKind::LeftOuter, "stops", "stop_times.stop_id=stops.stop_id")
            .join(JoinKind::LeftOuter, "attributions", "stop_times.trip_id=attributions.trip_id")
            .join(JoinKind::LeftOuter, "trips", "stop_times.trip_id=trips.trip_id")
            .join(JoinKind::LeftOuter, "routes", "trips.route_id=routes.route_id")
            .join(JoinKind::LeftOuter, "agency", "routes.agency_id=agency.agency_id")
            .join(
                JoinKind::LeftOuter,
                "stop_times_updates",
                "stop_times.stop_id=stop_times_updates.stop_id AND stop_times.trip_id=stop_times_updates.trip_id",
            )
            .filter(WhereSpec::new().with("stop_times.stop_id", WhereValue::list(stop_ids)))
            .order_by(OrderSpec::new().asc("stop_times.departure_time"));

        let timetable = self.run(&spec)?;
        let total = timetable.len();
        let departures = upcoming(timetable, now, default_window());
        debug!(provider = self.provider(), total, upcoming = departures.len(), "departures filtered");

        Ok(departures)
    }

    /// Service alerts, optionally narrowed by stop and/or route
    pub fn alerts(&self, stop_id: Option<&str>, route_id: Option<&str>) -> TransitResult<Vec<Row>> {
        let mut filter = WhereSpec::new();
        if let Some(stop_id) = stop_id {
            filter.insert("stop_id", stop_id);
        }
        if let Some(route_id) = route_id {
            filter.insert("route_id", route_id);
        }

        let spec = QuerySpec::table("service_alert_targets")
            .select(SelectSpec::aliased([
                ("alert_id", "alertId"),
                ("stop_id", "stopId"),
                ("route_id", "routeId"),
                ("start_time", "startTime"),
                ("end_time", "endTime"),
                ("cause", "cause"),
                ("headline", "headline"),
                ("description", "description"),
            ]))
            .join(JoinKind::Inner, "service_alerts", "service_alert_targets.alert_id=service_alerts.id")
            .filter(filter);

        self.run(&spec)
    }

    /// Stops; stations only unless child stops are requested
    pub fn stops(&self, filter: &StopFilter) -> TransitResult<Vec<Row>> {
        let mut conditions = WhereSpec::new();
        if !filter.include_children {
            conditions.insert("parent_station", WhereValue::Null);
        }
        if let Some(id) = &filter.id {
            conditions.insert("stop_id", id.as_str());
        }
        if let Some(name) = &filter.name {
            conditions.insert("stop_name", name.as_str());
        }

        let spec = QuerySpec::table("stops")
            .select(SelectSpec::aliased([
                ("stop_id", "stopId"),
                ("stop_name", "name"),
                ("stop_lat", "lat"),
                ("stop_lon", "lon"),
                ("parent_station", "parent"),
                ("platform_code", "platform"),
            ]))
            .filter(conditions);

        self.run(&spec)
    }

    /// Routes, optionally only those serving `stop`. Each route appears once.
    pub fn routes(&self, stop: Option<&StopRef>) -> TransitResult<Vec<Row>> {
        let mut filter = WhereSpec::new();
        if let Some(stop) = stop {
            let stop_ids = self.resolve_stop_ids(stop)?;
            filter.insert("stop_times.stop_id", WhereValue::list(stop_ids));
        }

        let spec = QuerySpec::table("routes")
            .select(SelectSpec::aliased([
                ("routes.route_id", "routeId"),
                ("agency_id", "agencyId"),
                ("route_short_name", "routeName"),
                ("route_desc", "routeNotes"),
                ("route_type", "routeType"),
            ]))
            .join(JoinKind::Inner, "trips", "routes.route_id=trips.route_id")
            .join(JoinKind::Inner, "stop_times", "stop_times.trip_id=trips.trip_id")
            .filter(filter);

        Ok(dedup_by(self.run(&spec)?, "routeId"))
    }

    /// Trips, optionally of one route
    pub fn trips(&self, route_id: Option<&str>) -> TransitResult<Vec<Row>> {
        let mut filter = WhereSpec::new();
        if let Some(route_id) = route_id {
            filter.insert("route_id", route_id);
        }

        let spec = QuerySpec::table("trips")
            .select(SelectSpec::aliased([
                ("trip_id", "tripId"),
                ("route_id", "routeId"),
                ("service_id", "serviceId"),
                ("trip_headsign", "tripSign"),
                ("trip_short_name", "tripName"),
                ("direction_id", "direction"),
            ]))
            .filter(filter);

        self.run(&spec)
    }
}

/// Keep the first row for each value of `key`, preserving order
fn dedup_by(rows: Vec<Row>, key: &str) -> Vec<Row> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.get(key).map(Value::to_string).unwrap_or_default()))
        .collect()
}
