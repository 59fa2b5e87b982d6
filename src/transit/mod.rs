//! # Transit Module
//!
//! Timetable reads for one provider: feed info, agencies, stops, routes,
//! trips, service alerts and upcoming departures.

pub mod departures;
pub mod errors;
pub mod service;

pub use departures::{default_window, departs_within, departure_instant, parse_gtfs_time, upcoming};
pub use errors::{TransitError, TransitResult};
pub use service::{StopFilter, StopRef, TransitService};
