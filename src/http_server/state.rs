//! Shared handler state

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use super::routes::RouteTable;
use crate::admission::AdmissionController;
use crate::dataset::DatasetRegistry;

/// Local wall clock used for the departure window
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Operator details shown on the public pages
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub software: String,
    pub version: String,
    pub contact: String,
}

impl ServiceInfo {
    pub fn new(contact: impl Into<String>) -> Self {
        Self {
            software: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact: contact.into(),
        }
    }
}

/// State shared across handlers
pub struct AppState {
    pub admission: AdmissionController,
    pub datasets: Arc<DatasetRegistry>,
    pub info: ServiceInfo,
    pub routes: RouteTable,
    pub clock: Clock,
}

impl AppState {
    pub fn new(admission: AdmissionController, datasets: Arc<DatasetRegistry>, info: ServiceInfo) -> Self {
        Self {
            admission,
            datasets,
            info,
            routes: RouteTable::default(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Provider names in configuration order
    pub fn providers(&self) -> Vec<String> {
        self.datasets.providers().map(String::from).collect()
    }
}
