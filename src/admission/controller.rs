//! # Admission Controller
//!
//! The per-request gate. Decision order, first match wins:
//!
//! 1. mode closed: `Maintenance`
//! 2. unknown key: `InvalidKey`
//! 3. inactive key: `InactiveKey`
//! 4. unlimited key: count, admit
//! 5. `current >= limit`: `QuotaExceeded`
//! 6. count, admit

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::errors::{AdmissionError, AdmissionResult};
use super::mode::SystemMode;
use super::registry::{ApiKeyRecord, KeyRegistry};

/// Owns the key registry and reads the shared mode flag
#[derive(Debug)]
pub struct AdmissionController {
    keys: KeyRegistry,
    mode: Arc<SystemMode>,
}

impl AdmissionController {
    pub fn new(keys: HashMap<String, ApiKeyRecord>, mode: Arc<SystemMode>) -> Self {
        Self {
            keys: KeyRegistry::new(keys),
            mode,
        }
    }

    /// Admit one request for `key`, counting it when admitted
    pub fn admit(&self, key: &str) -> AdmissionResult<()> {
        if !self.mode.is_open() {
            return Err(AdmissionError::Maintenance);
        }

        let result = self.keys.consume(key);
        if let Err(reason) = &result {
            debug!(code = reason.code(), "request denied");
        }
        result
    }

    /// Current state of a key, without counting
    pub fn key_info(&self, key: &str) -> AdmissionResult<ApiKeyRecord> {
        self.keys.snapshot(key).ok_or(AdmissionError::InvalidKey)
    }

    /// The shared mode flag
    pub fn mode(&self) -> &Arc<SystemMode> {
        &self.mode
    }
}
