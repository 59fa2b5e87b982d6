//! Observability for timetable-api
//!
//! Structured logging through `tracing`. Request spans are added by the HTTP
//! layer; refresh jobs log one event per provider outcome.

mod logger;

pub use logger::{init_logging, LogFormat};
