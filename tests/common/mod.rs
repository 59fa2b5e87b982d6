//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tempfile::TempDir;
use timetable_api::dataset::DatasetHandle;

pub const GTFS_SCHEMA: &str = "
    CREATE TABLE feed_info (id INTEGER, feed_publisher_name TEXT, feed_publisher_url TEXT,
                            feed_lang TEXT, feed_version TEXT);
    CREATE TABLE agency (agency_id TEXT, agency_name TEXT, agency_url TEXT, agency_fare_url TEXT);
    CREATE TABLE stops (stop_id TEXT, stop_name TEXT, stop_lat REAL, stop_lon REAL,
                        parent_station TEXT, platform_code TEXT);
    CREATE TABLE routes (route_id TEXT, agency_id TEXT, route_short_name TEXT,
                         route_desc TEXT, route_type INTEGER);
    CREATE TABLE trips (trip_id TEXT, route_id TEXT, service_id TEXT, trip_headsign TEXT,
                        trip_short_name TEXT, direction_id INTEGER);
    CREATE TABLE stop_times (trip_id TEXT, stop_id TEXT, arrival_time TEXT,
                             departure_time TEXT, stop_headsign TEXT);
    CREATE TABLE attributions (trip_id TEXT, organization_name TEXT);
    CREATE TABLE stop_times_updates (trip_id TEXT, stop_id TEXT, arrival_delay INTEGER,
                                     departure_delay INTEGER);
    CREATE TABLE service_alerts (id TEXT, cause TEXT, start_time INTEGER, end_time INTEGER,
                                 headline TEXT, description TEXT);
    CREATE TABLE service_alert_targets (alert_id TEXT, stop_id TEXT, route_id TEXT);

    INSERT INTO feed_info VALUES (1, 'Trafiklab', 'https://trafiklab.se', 'sv', '2024-05');
    INSERT INTO agency VALUES ('SL', 'Storstockholms Lokaltrafik', 'https://sl.se', NULL);
    INSERT INTO stops VALUES ('S1', 'Odenplan', 59.343, 18.049, NULL, NULL),
                             ('S1A', 'Odenplan', 59.343, 18.049, 'S1', 'A'),
                             ('S2', 'Slussen', 59.319, 18.072, NULL, NULL);
    INSERT INTO routes VALUES ('R4', 'SL', '4', 'Blue bus', 3),
                              ('R17', 'SL', '17', 'Green line', 1);
    INSERT INTO trips VALUES ('T1', 'R4', 'WD', 'Gullmarsplan', NULL, 0),
                             ('T2', 'R4', 'WD', 'Radiohuset', NULL, 1),
                             ('T3', 'R17', 'WD', 'Skarpnäck', NULL, 0);
    INSERT INTO stop_times VALUES ('T1', 'S1A', '12:10:00', '12:10:30', 'Gullmarsplan'),
                                  ('T2', 'S1', '12:40:00', '12:40:00', 'Radiohuset'),
                                  ('T3', 'S2', '12:20:00', '12:20:00', 'Skarpnäck'),
                                  ('T2', 'S2', '13:40:00', '13:40:00', 'Radiohuset');
    INSERT INTO attributions VALUES ('T1', 'Keolis');
    INSERT INTO stop_times_updates VALUES ('T1', 'S1A', 60, 90);
    INSERT INTO service_alerts VALUES ('A1', 'STRIKE', 0, 0, 'Strike', 'No service');
    INSERT INTO service_alert_targets VALUES ('A1', 'S1', 'R4');
";

/// Write the sample GTFS dataset to `path`
pub fn write_gtfs(path: &Path) {
    Connection::open(path).unwrap().execute_batch(GTFS_SCHEMA).unwrap();
}

/// A temp dir holding `<provider>.db` with the sample dataset
pub fn gtfs_fixture(provider: &str) -> (TempDir, DatasetHandle) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let path = tmp.path().join(format!("{}.db", provider));
    write_gtfs(&path);
    let handle = DatasetHandle::open(provider, &path, Duration::from_millis(500)).unwrap();
    (tmp, handle)
}
