//! # Refresh Schedules
//!
//! Cron expressions (five fields, or six with leading seconds) and the
//! recurring task that fires a job at each occurrence.

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Local};
use croner::Cron;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::errors::ScheduleError;

/// A parsed cron expression
pub struct Schedule {
    expression: String,
    cron: Cron,
}

impl Schedule {
    /// Parse a cron expression
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let cron = Cron::new(expression)
            .with_seconds_optional()
            .parse()
            .map_err(|e| ScheduleError {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            expression: expression.to_string(),
            cron,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `after`
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.cron.find_next_occurrence(after, false).ok()
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("expression", &self.expression)
            .finish()
    }
}

/// Run `job` at every occurrence of `schedule` until the task is aborted.
///
/// The job is awaited before the next occurrence is computed, so a slow job
/// skips the occurrences it overran instead of piling up.
pub fn spawn_recurring<F, Fut>(schedule: Schedule, name: &'static str, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let Some(next) = schedule.next_after(&now) else {
                warn!(job = name, schedule = schedule.expression(), "schedule has no further occurrences");
                return;
            };

            debug!(job = name, next = %next, "next run scheduled");
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            job().await;
        }
    })
}
