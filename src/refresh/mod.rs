//! # Refresh Module
//!
//! Scheduled dataset refreshes.
//!
//! - A full reimport runs with the system in maintenance mode and restores
//!   the mode flag when it finishes, even on failure
//! - Real-time updates run only while the system is open
//! - Provider failures are isolated and logged

pub mod coordinator;
pub mod errors;
pub mod importer;
pub mod schedule;

pub use coordinator::{RefreshCoordinator, RefreshOutcome, RefreshReport};
pub use errors::{ImportError, ScheduleError, UpdateError};
pub use importer::{CommandImporter, DatasetImporter};
pub use schedule::{spawn_recurring, Schedule};
