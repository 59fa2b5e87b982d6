//! # Departure Window
//!
//! GTFS stop times are offsets from the service day's midnight written as
//! `H:MM:SS`; trips running past midnight use hours of 24 and above. A
//! departure is upcoming when, for the service day before, of or after
//! `now`, the resulting instant falls in `(now, now + window]`.

use chrono::{Duration, NaiveDateTime};

use crate::query::Row;

/// Result field holding the departure offset
pub const DEPARTURE_FIELD: &str = "departureTime";

/// Length of the upcoming-departures window
pub fn default_window() -> Duration {
    Duration::hours(1)
}

/// Parse a GTFS `H:MM:SS` time into an offset from service-day midnight
pub fn parse_gtfs_time(value: &str) -> Option<Duration> {
    let mut parts = value.trim().split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;

    if parts.next().is_some() || hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }

    Some(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

/// The instant a departure at `offset` leaves, if it falls in
/// `(now, now + window]` on any adjacent service day
pub fn departure_instant(offset: Duration, now: NaiveDateTime, window: Duration) -> Option<NaiveDateTime> {
    let today = now.date();
    let end = now.checked_add_signed(window)?;

    [today.pred_opt(), Some(today), today.succ_opt()]
        .into_iter()
        .flatten()
        .filter_map(|day| day.and_hms_opt(0, 0, 0))
        .filter_map(|midnight| midnight.checked_add_signed(offset))
        .find(|instant| *instant > now && *instant <= end)
}

/// Whether a departure at `offset` falls in `(now, now + window]`
pub fn departs_within(offset: Duration, now: NaiveDateTime, window: Duration) -> bool {
    departure_instant(offset, now, window).is_some()
}

/// Keep the rows departing within `window` of `now`, earliest first.
/// Rows leaving at the same instant keep their input order; rows without a
/// parseable departure time are dropped.
pub fn upcoming(rows: Vec<Row>, now: NaiveDateTime, window: Duration) -> Vec<Row> {
    let mut timed: Vec<(NaiveDateTime, Row)> = rows
        .into_iter()
        .filter_map(|row| {
            let instant = row
                .get(DEPARTURE_FIELD)
                .and_then(|v| v.as_str())
                .and_then(parse_gtfs_time)
                .and_then(|offset| departure_instant(offset, now, window))?;
            Some((instant, row))
        })
        .collect();

    timed.sort_by_key(|(instant, _)| *instant);
    timed.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn row(time: &str) -> Row {
        json!({ "tripId": time, "departureTime": time })
            .as_object()
            .unwrap()
            .clone()
    }

    fn kept(rows: Vec<Row>, now: NaiveDateTime) -> Vec<String> {
        upcoming(rows, now, default_window())
            .into_iter()
            .map(|r| r["tripId"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_parse_gtfs_time() {
        assert_eq!(parse_gtfs_time("08:15:30"), Some(Duration::seconds(8 * 3600 + 15 * 60 + 30)));
        assert_eq!(parse_gtfs_time("8:15:30"), Some(Duration::seconds(8 * 3600 + 15 * 60 + 30)));
        assert_eq!(parse_gtfs_time("25:10:00"), Some(Duration::seconds(25 * 3600 + 600)));
        assert_eq!(parse_gtfs_time("08:61:00"), None);
        assert_eq!(parse_gtfs_time("08:15"), None);
        assert_eq!(parse_gtfs_time("08:15:00:00"), None);
        assert_eq!(parse_gtfs_time(""), None);
    }

    #[test]
    fn test_window_boundaries() {
        let now = at(12, 0, 0);
        let rows = vec![row("12:00:00"), row("12:00:01"), row("13:00:00"), row("13:00:01")];

        assert_eq!(kept(rows, now), vec!["12:00:01", "13:00:00"]);
    }

    #[test]
    fn test_past_midnight_offsets() {
        // 25:10 on yesterday's service day is 01:10 today
        let now = at(0, 30, 0);
        let rows = vec![row("25:10:00"), row("01:10:00"), row("23:50:00")];

        assert_eq!(kept(rows, now), vec!["25:10:00", "01:10:00"]);
    }

    #[test]
    fn test_window_crossing_midnight() {
        // 00:20 on tomorrow's service day
        let now = at(23, 30, 0);
        let rows = vec![row("00:20:00"), row("24:10:00"), row("23:00:00")];

        assert_eq!(kept(rows, now), vec!["24:10:00", "00:20:00"]);
    }

    #[test]
    fn test_earliest_first_across_midnight() {
        let now = at(23, 30, 0);
        let rows = vec![row("00:20:00"), row("23:45:00"), row("24:10:00")];

        assert_eq!(kept(rows, now), vec!["23:45:00", "24:10:00", "00:20:00"]);
    }

    #[test]
    fn test_single_digit_hours_sort_by_time() {
        let now = at(8, 59, 0);
        let rows = vec![row("09:40:00"), row("9:05:00"), row("09:20:00")];

        assert_eq!(kept(rows, now), vec!["9:05:00", "09:20:00", "09:40:00"]);
    }

    #[test]
    fn test_departure_instant_service_day() {
        let now = at(23, 30, 0);
        let tomorrow = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        assert_eq!(
            departure_instant(parse_gtfs_time("00:20:00").unwrap(), now, default_window()),
            tomorrow.and_hms_opt(0, 20, 0)
        );
        assert_eq!(departure_instant(parse_gtfs_time("23:00:00").unwrap(), now, default_window()), None);
    }

    #[test]
    fn test_unparseable_and_missing_dropped() {
        let now = at(12, 0, 0);
        let mut missing = row("x");
        missing.remove(DEPARTURE_FIELD);
        let mut null = row("y");
        null.insert(DEPARTURE_FIELD.to_string(), serde_json::Value::Null);

        let rows = vec![row("soon"), missing, null, row("12:30:00")];
        assert_eq!(kept(rows, now), vec!["12:30:00"]);
    }
}
