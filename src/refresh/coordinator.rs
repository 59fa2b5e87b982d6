//! # Refresh Coordinator
//!
//! Two jobs over all configured providers:
//!
//! - **Full reimport**: closes the mode flag, reimports every provider, then
//!   restores the flag. A trigger that finds the flag closed is dropped.
//! - **Incremental update**: applies real-time updates while the flag is
//!   open; never touches the flag.
//!
//! One provider's failure never stops the others. Results are reported in
//! configuration order.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};

use super::errors::{ImportError, JobError, UpdateError};
use super::importer::DatasetImporter;
use crate::admission::SystemMode;
use crate::config::ProviderConfig;
use crate::dataset::{DatasetError, DatasetHandle, DatasetRegistry};

/// Per-provider results of one job run
#[derive(Debug)]
pub struct RefreshReport<E> {
    pub results: Vec<(String, Result<(), E>)>,
}

impl<E> RefreshReport<E> {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    /// Providers that failed, with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &E)> {
        self.results
            .iter()
            .filter_map(|(provider, r)| r.as_ref().err().map(|e| (provider.as_str(), e)))
    }
}

/// What a job trigger did
#[derive(Debug)]
pub enum RefreshOutcome<E> {
    Completed(RefreshReport<E>),
    /// The flag was closed when the job fired
    Skipped,
}

impl<E> RefreshOutcome<E> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RefreshOutcome::Skipped)
    }

    pub fn report(&self) -> Option<&RefreshReport<E>> {
        match self {
            RefreshOutcome::Completed(report) => Some(report),
            RefreshOutcome::Skipped => None,
        }
    }
}

/// Coordinates dataset refreshes against the mode flag
pub struct RefreshCoordinator {
    providers: Vec<ProviderConfig>,
    datasets: Arc<DatasetRegistry>,
    importer: Arc<dyn DatasetImporter>,
    mode: Arc<SystemMode>,
    concurrency: usize,
}

impl RefreshCoordinator {
    pub fn new(
        providers: Vec<ProviderConfig>,
        datasets: Arc<DatasetRegistry>,
        importer: Arc<dyn DatasetImporter>,
        mode: Arc<SystemMode>,
    ) -> Self {
        Self {
            providers,
            datasets,
            importer,
            mode,
            concurrency: 1,
        }
    }

    /// Refresh up to `concurrency` providers at once (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn mode(&self) -> &Arc<SystemMode> {
        &self.mode
    }

    /// Reimport every provider with the system in maintenance mode
    pub async fn full_reimport(&self) -> RefreshOutcome<ImportError> {
        let Some(guard) = self.mode.try_enter_maintenance() else {
            warn!("full reimport triggered while already in maintenance mode, skipping");
            return RefreshOutcome::Skipped;
        };

        info!(providers = self.providers.len(), "full reimport started");
        let report = self
            .run_per_provider("full reimport", |importer, provider, handle| {
                importer.import_full(provider, handle)
            })
            .await;

        drop(guard);
        info!(failed = report.failures().count(), "full reimport finished, system open");
        RefreshOutcome::Completed(report)
    }

    /// Apply real-time updates to every provider
    pub async fn incremental_update(&self) -> RefreshOutcome<UpdateError> {
        if !self.mode.is_open() {
            warn!("real-time update triggered while in maintenance mode, skipping");
            return RefreshOutcome::Skipped;
        }

        info!(providers = self.providers.len(), "real-time update started");
        let report = self
            .run_per_provider("real-time update", |importer, provider, handle| {
                importer.apply_incremental(provider, handle)
            })
            .await;

        info!(failed = report.failures().count(), "real-time update finished");
        RefreshOutcome::Completed(report)
    }

    async fn run_per_provider<E, F>(&self, job: &'static str, run: F) -> RefreshReport<E>
    where
        E: JobError + std::fmt::Display,
        F: Fn(&dyn DatasetImporter, &ProviderConfig, &DatasetHandle) -> Result<(), E>
            + Clone
            + Send
            + Sync
            + 'static,
    {
        let tasks = self.providers.iter().cloned().map(|provider| {
            let importer = Arc::clone(&self.importer);
            let handle = self.datasets.get(&provider.name);
            let run = run.clone();

            async move {
                let name = provider.name.clone();
                let result = match handle {
                    None => Err(E::from(DatasetError::UnknownProvider(name.clone()))),
                    Some(handle) => {
                        tokio::task::spawn_blocking(move || run(importer.as_ref(), &provider, handle.as_ref()))
                            .await
                            .unwrap_or_else(|e| Err(E::panicked(&name, e.to_string())))
                    }
                };

                match &result {
                    Ok(()) => info!(job, provider = %name, "provider refreshed"),
                    Err(e) => error!(job, provider = %name, error = %e, "provider refresh failed"),
                }
                (name, result)
            }
        });

        let results = stream::iter(tasks)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        RefreshReport { results }
    }
}
