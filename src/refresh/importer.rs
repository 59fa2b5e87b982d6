//! # Dataset Importer
//!
//! The boundary to the GTFS / GTFS-RT tooling. Parsing feeds is not done in
//! this crate: a provider's import and update steps are external commands
//! that write its SQLite file, after which the dataset handle is re-opened.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::errors::{ImportError, UpdateError};
use crate::config::ProviderConfig;
use crate::dataset::DatasetHandle;

/// Refreshes provider datasets. Implementations block; the coordinator runs
/// them off the async runtime.
pub trait DatasetImporter: Send + Sync {
    /// Rebuild the provider's dataset from its static feed
    fn import_full(&self, provider: &ProviderConfig, handle: &DatasetHandle) -> Result<(), ImportError>;

    /// Apply real-time updates to the provider's dataset
    fn apply_incremental(&self, provider: &ProviderConfig, handle: &DatasetHandle) -> Result<(), UpdateError>;
}

/// Runs the configured `import_command` / `update_command` of each provider
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandImporter;

impl CommandImporter {
    pub fn new() -> Self {
        Self
    }
}

impl DatasetImporter for CommandImporter {
    fn import_full(&self, provider: &ProviderConfig, handle: &DatasetHandle) -> Result<(), ImportError> {
        if !provider.dataset.import_command.is_empty() {
            run_command(&provider.dataset.import_command, command_timeout(provider)).map_err(|message| ImportError::Command {
                provider: provider.name.clone(),
                message,
            })?;
        }

        // The import may have replaced the file; serve the new one
        handle.reopen()?;
        info!(provider = %provider.name, generation = handle.generation(), "dataset reimported");
        Ok(())
    }

    fn apply_incremental(&self, provider: &ProviderConfig, _handle: &DatasetHandle) -> Result<(), UpdateError> {
        if provider.dataset.update_command.is_empty() {
            debug!(provider = %provider.name, "no update command configured");
            return Ok(());
        }

        run_command(&provider.dataset.update_command, command_timeout(provider)).map_err(|message| UpdateError::Command {
            provider: provider.name.clone(),
            message,
        })?;

        info!(provider = %provider.name, "real-time updates applied");
        Ok(())
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn command_timeout(provider: &ProviderConfig) -> Duration {
    Duration::from_secs(provider.dataset.command_timeout_secs)
}

/// Run argv without a shell; a non-zero exit is an error carrying the last
/// line of stderr. A command still running after `timeout` is killed.
fn run_command(argv: &[String], timeout: Duration) -> Result<(), String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| "empty command".to_string())?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("cannot run {}: {}", program, e))?;

    // Drain stderr so a chatty command never blocks on a full pipe
    let stderr = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    // An unrepresentable deadline means no deadline
    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if deadline.map_or(false, |d| Instant::now() >= d) => {
                warn!(program = %program, timeout_secs = timeout.as_secs(), "command timed out, killing");
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("{} timed out after {:?}", program, timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("cannot wait for {}: {}", program, e)),
        }
    };

    if status.success() {
        return Ok(());
    }

    let stderr = stderr
        .and_then(|reader| reader.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default();
    let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
    Err(format!("{} exited with {}: {}", program, status, last_line.trim()))
}
