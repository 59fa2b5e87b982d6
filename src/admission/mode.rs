//! # System Mode
//!
//! The process-wide open/maintenance flag. Request admission reads it on every
//! request; a full reimport closes it for its duration through a
//! [`MaintenanceGuard`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Open (serving) or closed (maintenance)
#[derive(Debug)]
pub struct SystemMode {
    open: AtomicBool,
}

impl SystemMode {
    pub fn new(open: bool) -> Self {
        Self {
            open: AtomicBool::new(open),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Overwrite the flag
    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::Release);
    }

    /// Close the flag if it is open.
    ///
    /// Returns `None` when the flag was already closed; at most one guard
    /// exists at a time. Dropping the guard restores the value it replaced.
    pub fn try_enter_maintenance(self: &Arc<Self>) -> Option<MaintenanceGuard> {
        self.open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|prior| MaintenanceGuard {
                mode: Arc::clone(self),
                prior,
            })
    }

    /// "open" or "maintenance"
    pub fn label(&self) -> &'static str {
        if self.is_open() {
            "open"
        } else {
            "maintenance"
        }
    }
}

impl Default for SystemMode {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Holds the flag closed until dropped
#[derive(Debug)]
pub struct MaintenanceGuard {
    mode: Arc<SystemMode>,
    prior: bool,
}

impl Drop for MaintenanceGuard {
    fn drop(&mut self) {
        self.mode.set_open(self.prior);
    }
}
