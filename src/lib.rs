//! timetable-api - A key-gated, read-only timetable API over GTFS datasets
//!
//! Requests are admitted against per-key quotas and a maintenance flag,
//! then answered by composed SQLite queries. Datasets are refreshed on cron
//! schedules.

pub mod admission;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod refresh;
pub mod transit;
