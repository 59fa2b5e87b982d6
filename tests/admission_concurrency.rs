//! Admission Concurrency Tests
//!
//! The quota check and the counter increment are one critical section:
//! - a bounded key admits exactly `limit` requests under any interleaving
//! - an unlimited key is never quota-denied
//! - a closed mode flag denies every key, counting nothing

use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

use timetable_api::admission::{AdmissionController, AdmissionError, ApiKeyRecord, SystemMode};

// =============================================================================
// Test Utilities
// =============================================================================

fn controller(records: &[(&str, ApiKeyRecord)]) -> Arc<AdmissionController> {
    let keys: HashMap<_, _> = records
        .iter()
        .map(|(key, record)| (key.to_string(), record.clone()))
        .collect();
    Arc::new(AdmissionController::new(keys, Arc::new(SystemMode::new(true))))
}

/// Fire `per_thread` requests from each of `threads` threads at once and
/// collect every decision
fn hammer(
    gate: &Arc<AdmissionController>,
    key: &'static str,
    threads: usize,
    per_thread: usize,
) -> Vec<Result<(), AdmissionError>> {
    let barrier = Arc::new(Barrier::new(threads));
    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let gate = Arc::clone(gate);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..per_thread).map(|_| gate.admit(key)).collect::<Vec<_>>()
            })
        })
        .collect();

    workers
        .into_iter()
        .flat_map(|worker| worker.join().unwrap())
        .collect()
}

// =============================================================================
// Quotas under contention
// =============================================================================

#[test]
fn test_bounded_key_admits_exactly_limit() {
    let gate = controller(&[("bounded", ApiKeyRecord::new(true, 50))]);

    let decisions = hammer(&gate, "bounded", 8, 25);

    let admitted = decisions.iter().filter(|d| d.is_ok()).count();
    let denied = decisions
        .iter()
        .filter(|d| **d == Err(AdmissionError::QuotaExceeded { limit: 50 }))
        .count();

    assert_eq!(admitted, 50);
    assert_eq!(denied, 8 * 25 - 50);
    assert_eq!(gate.key_info("bounded").unwrap().current, 50);
}

#[test]
fn test_unlimited_key_counts_but_never_denies() {
    let mut record = ApiKeyRecord::unlimited();
    record.current = u64::MAX / 2;
    let gate = controller(&[("free", record)]);

    let decisions = hammer(&gate, "free", 4, 100);

    assert!(decisions.iter().all(|d| d.is_ok()));
    assert_eq!(gate.key_info("free").unwrap().current, u64::MAX / 2 + 400);
}

#[test]
fn test_starting_counter_from_config_is_honoured() {
    let mut record = ApiKeyRecord::new(true, 10);
    record.current = 8;
    let gate = controller(&[("k", record)]);

    let decisions = hammer(&gate, "k", 4, 5);
    assert_eq!(decisions.iter().filter(|d| d.is_ok()).count(), 2);
}

// =============================================================================
// Maintenance mode
// =============================================================================

#[test]
fn test_maintenance_denies_all_keys_without_counting() {
    let gate = controller(&[
        ("free", ApiKeyRecord::unlimited()),
        ("bounded", ApiKeyRecord::new(true, 5)),
    ]);
    let guard = gate.mode().try_enter_maintenance().unwrap();

    for key in ["free", "bounded", "unknown"] {
        assert_eq!(gate.admit(key), Err(AdmissionError::Maintenance));
    }
    assert_eq!(gate.key_info("bounded").unwrap().current, 0);

    drop(guard);
    assert!(gate.admit("bounded").is_ok());
}

#[test]
fn test_reasons_in_order() {
    let gate = controller(&[
        ("inactive", ApiKeyRecord::new(false, 5)),
        ("spent", ApiKeyRecord::new(true, 0)),
    ]);

    assert_eq!(gate.admit("missing"), Err(AdmissionError::InvalidKey));
    assert_eq!(gate.admit("inactive"), Err(AdmissionError::InactiveKey));
    assert_eq!(gate.admit("spent"), Err(AdmissionError::QuotaExceeded { limit: 0 }));
}
