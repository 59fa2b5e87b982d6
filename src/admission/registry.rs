//! # Key Registry
//!
//! In-memory API key records. Counters start from the configured `current`
//! value and are never written back.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::errors::{AdmissionError, AdmissionResult};

/// Limit value meaning "no quota"
pub const UNLIMITED: i64 = -1;

/// One API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub active: bool,

    /// `-1` for unlimited, otherwise the number of admissions allowed
    pub limit: i64,

    /// Admissions so far in this process
    #[serde(default)]
    pub current: u64,
}

impl ApiKeyRecord {
    pub fn new(active: bool, limit: i64) -> Self {
        Self {
            active,
            limit,
            current: 0,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(true, UNLIMITED)
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == UNLIMITED
    }

    /// Check the key and count one admission.
    ///
    /// `current` only moves when the result is `Ok`.
    pub fn consume(&mut self) -> AdmissionResult<()> {
        if !self.active {
            return Err(AdmissionError::InactiveKey);
        }

        if self.is_unlimited() {
            self.current = self.current.saturating_add(1);
            return Ok(());
        }

        // A negative limit other than -1 never passes validation; treat as zero
        let limit = u64::try_from(self.limit).unwrap_or(0);
        if self.current >= limit {
            return Err(AdmissionError::QuotaExceeded { limit: self.limit });
        }

        self.current += 1;
        Ok(())
    }
}

/// All known keys
#[derive(Debug, Default)]
pub struct KeyRegistry {
    records: Mutex<HashMap<String, ApiKeyRecord>>,
}

impl KeyRegistry {
    pub fn new(records: HashMap<String, ApiKeyRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    // Counters are plain integers updated in one step, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ApiKeyRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key` and count one admission against it, atomically
    pub fn consume(&self, key: &str) -> AdmissionResult<()> {
        let mut records = self.lock();
        let record = records.get_mut(key).ok_or(AdmissionError::InvalidKey)?;
        record.consume()
    }

    /// Copy of a key's current state
    pub fn snapshot(&self, key: &str) -> Option<ApiKeyRecord> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_record() {
        let mut record = ApiKeyRecord::new(true, 2);

        assert!(record.consume().is_ok());
        assert!(record.consume().is_ok());
        assert_eq!(
            record.consume(),
            Err(AdmissionError::QuotaExceeded { limit: 2 })
        );
        assert_eq!(record.current, 2);
    }

    #[test]
    fn test_zero_limit_never_admits() {
        let mut record = ApiKeyRecord::new(true, 0);
        assert!(matches!(record.consume(), Err(AdmissionError::QuotaExceeded { .. })));
        assert_eq!(record.current, 0);
    }

    #[test]
    fn test_inactive_record_is_not_counted() {
        let mut record = ApiKeyRecord::new(false, UNLIMITED);
        assert_eq!(record.consume(), Err(AdmissionError::InactiveKey));
        assert_eq!(record.current, 0);
    }

    #[test]
    fn test_unlimited_ignores_current() {
        let mut record = ApiKeyRecord::unlimited();
        record.current = u64::MAX - 10;

        for _ in 0..5 {
            assert!(record.consume().is_ok());
        }
        assert_eq!(record.current, u64::MAX - 5);
    }

    #[test]
    fn test_unlimited_counter_saturates() {
        let mut record = ApiKeyRecord::unlimited();
        record.current = u64::MAX;

        assert!(record.consume().is_ok());
        assert!(record.consume().is_ok());
        assert_eq!(record.current, u64::MAX);
    }

    #[test]
    fn test_registry_unknown_key() {
        let registry = KeyRegistry::default();
        assert_eq!(registry.consume("nope"), Err(AdmissionError::InvalidKey));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_snapshot_tracks_usage() {
        let mut records = HashMap::new();
        records.insert("abc".to_string(), ApiKeyRecord::new(true, 5));
        let registry = KeyRegistry::new(records);

        registry.consume("abc").unwrap();
        registry.consume("abc").unwrap();

        assert_eq!(registry.snapshot("abc").unwrap().current, 2);
        assert!(registry.snapshot("missing").is_none());
    }
}
