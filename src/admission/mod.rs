//! # Admission Module
//!
//! API key authentication, per-key quotas and the maintenance gate.
//!
//! Quota counters live in memory for the lifetime of the process. Lookup,
//! quota comparison and increment happen under one lock, so concurrent
//! requests on a bounded key cannot overrun it.

pub mod controller;
pub mod errors;
pub mod mode;
pub mod registry;

pub use controller::AdmissionController;
pub use errors::{AdmissionError, AdmissionResult};
pub use mode::{MaintenanceGuard, SystemMode};
pub use registry::{ApiKeyRecord, KeyRegistry, UNLIMITED};
