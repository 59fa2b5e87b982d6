//! # Dataset Registry
//!
//! Maps provider names to their dataset handles, in configuration order.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;

use super::errors::{DatasetError, DatasetResult};
use super::handle::DatasetHandle;
use crate::config::ProviderConfig;

/// Provider name to dataset handle
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    handles: IndexMap<String, Arc<DatasetHandle>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a handle for every configured provider.
    ///
    /// Fails on the first dataset that cannot be opened; the process must not
    /// start with a missing handle.
    pub fn open(providers: &[ProviderConfig]) -> DatasetResult<Self> {
        let mut registry = Self::new();

        for provider in providers {
            let handle = DatasetHandle::open(
                &provider.name,
                &provider.dataset.sqlite_path,
                Duration::from_millis(provider.dataset.busy_timeout_ms),
            )?;
            registry.insert(handle);
        }

        Ok(registry)
    }

    /// Register a handle under its provider name
    pub fn insert(&mut self, handle: DatasetHandle) -> Arc<DatasetHandle> {
        let handle = Arc::new(handle);
        self.handles
            .insert(handle.provider().to_string(), Arc::clone(&handle));
        handle
    }

    pub fn get(&self, provider: &str) -> Option<Arc<DatasetHandle>> {
        self.handles.get(provider).cloned()
    }

    /// Like [`DatasetRegistry::get`] but with a typed error
    pub fn require(&self, provider: &str) -> DatasetResult<Arc<DatasetHandle>> {
        self.get(provider)
            .ok_or_else(|| DatasetError::UnknownProvider(provider.to_string()))
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.handles.contains_key(provider)
    }

    /// Provider names in configuration order
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
