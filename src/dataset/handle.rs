//! # Dataset Handle
//!
//! One provider's SQLite dataset. The handle owns the current connection and
//! swaps it for a freshly opened one after a reimport. A replacement is fully
//! opened and verified before the swap, and readers that already cloned the
//! previous connection finish their statement on it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use super::errors::{DatasetError, DatasetResult};

type SharedConnection = Arc<Mutex<Connection>>;

/// Handle to a provider's dataset
#[derive(Debug)]
pub struct DatasetHandle {
    provider: String,
    path: PathBuf,
    busy_timeout: Duration,
    connection: RwLock<SharedConnection>,
    generation: AtomicU64,
}

impl DatasetHandle {
    /// Open the dataset at `path`, creating an empty database if the file
    /// does not exist yet (the first full import fills it).
    pub fn open(
        provider: impl Into<String>,
        path: impl Into<PathBuf>,
        busy_timeout: Duration,
    ) -> DatasetResult<Self> {
        let provider = provider.into();
        let path = path.into();
        let connection = open_connection(&provider, &path, busy_timeout)?;

        info!(provider = %provider, path = %path.display(), "dataset opened");

        Ok(Self {
            provider,
            path,
            busy_timeout,
            connection: RwLock::new(Arc::new(Mutex::new(connection))),
            generation: AtomicU64::new(0),
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of completed swaps since startup
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Open a new connection to the dataset file and swap it in.
    ///
    /// On failure the current connection stays in place.
    pub fn reopen(&self) -> DatasetResult<()> {
        let fresh = open_connection(&self.provider, &self.path, self.busy_timeout)?;

        {
            let mut current = self
                .connection
                .write()
                .map_err(|_| DatasetError::Internal("Lock poisoned".into()))?;
            *current = Arc::new(Mutex::new(fresh));
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(provider = %self.provider, generation, "dataset connection swapped");
        Ok(())
    }

    /// Run `f` with the current connection
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> DatasetResult<T> {
        let shared = self
            .connection
            .read()
            .map_err(|_| DatasetError::Internal("Lock poisoned".into()))?
            .clone();

        let connection = shared
            .lock()
            .map_err(|_| DatasetError::Internal("Lock poisoned".into()))?;

        Ok(f(&connection))
    }
}

fn open_connection(provider: &str, path: &Path, busy_timeout: Duration) -> DatasetResult<Connection> {
    let open_error = |e: rusqlite::Error| DatasetError::Open {
        provider: provider.to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if !path.exists() {
        Connection::open(path).map_err(open_error)?;
    }

    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
    )
    .map_err(open_error)?;

    connection.busy_timeout(busy_timeout).map_err(open_error)?;

    connection
        .query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
        .map_err(|e| DatasetError::Verify {
            provider: provider.to_string(),
            message: e.to_string(),
        })?;

    Ok(connection)
}
