//! CLI command implementations
//!
//! `start` boots in a fixed order: configuration, logging, datasets, mode
//! flag and admission, refresh schedules, listener. Any failure before the
//! listener is bound is fatal.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use crate::admission::{AdmissionController, SystemMode};
use crate::config::AppConfig;
use crate::dataset::DatasetRegistry;
use crate::http_server::{AppState, HttpServer, ServiceInfo};
use crate::observability::init_logging;
use crate::refresh::{spawn_recurring, CommandImporter, RefreshCoordinator, Schedule};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config } => start(&config),
        Command::Check { config } => check(&config),
    }
}

/// Validate the configuration and open every dataset.
///
/// Writes a summary to stdout. Missing dataset files are created empty.
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let datasets = DatasetRegistry::open(&config.provider_configs())?;

    write_response(json!({
        "config": config_path.display().to_string(),
        "providers": datasets.providers().collect::<Vec<_>>(),
        "keys": config.keys.len(),
        "open": config.app.open,
    }))
}

/// Boot the system and serve until Ctrl-C
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;

    init_logging(config.app.verbose, config.app.log_format, &config.app.log_level)
        .map_err(|e| CliError::boot_failed(format!("Failed to initialise logging: {}", e)))?;

    let providers = config.provider_configs();
    let datasets = Arc::new(DatasetRegistry::open(&providers)?);
    info!(providers = datasets.len(), "datasets opened");

    let mode = Arc::new(SystemMode::new(config.app.open));
    let admission = AdmissionController::new(config.keys.clone(), Arc::clone(&mode));

    let coordinator = Arc::new(
        RefreshCoordinator::new(
            providers,
            Arc::clone(&datasets),
            Arc::new(CommandImporter::new()),
            mode,
        )
        .with_concurrency(config.app.refresh_concurrency),
    );

    let import_schedule = Schedule::parse(&config.app.import_schedule)
        .map_err(|e| CliError::config_error(e.to_string()))?;
    let update_schedule = Schedule::parse(&config.app.update_schedule)
        .map_err(|e| CliError::config_error(e.to_string()))?;

    let state = AppState::new(admission, datasets, ServiceInfo::new(config.app.contact.clone()));
    let server = HttpServer::new(config.socket_addr(), state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        // Serve fresh data from the start
        let warm = Arc::clone(&coordinator);
        tokio::spawn(async move {
            warm.full_reimport().await;
        });

        let reimport = Arc::clone(&coordinator);
        let import_task = spawn_recurring(import_schedule, "full reimport", move || {
            let coordinator = Arc::clone(&reimport);
            async move {
                coordinator.full_reimport().await;
            }
        });

        let update = Arc::clone(&coordinator);
        let update_task = spawn_recurring(update_schedule, "real-time update", move || {
            let coordinator = Arc::clone(&update);
            async move {
                coordinator.incremental_update().await;
            }
        });

        let served = server.start(shutdown_signal()).await;

        import_task.abort();
        update_task.abort();

        served.map_err(|e| CliError::io_error(format!("HTTP server failed: {}", e)))
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_opens_datasets() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.json");
        let db = tmp.path().join("sl.db");
        fs::write(
            &config_path,
            json!({
                "app": { "providers": ["sl"] },
                "datasets": { "sl": { "sqlite_path": db } },
            })
            .to_string(),
        )
        .unwrap();

        check(&config_path).unwrap();
        assert!(db.exists());
    }

    #[test]
    fn test_check_missing_config() {
        let tmp = TempDir::new().unwrap();
        let err = check(&tmp.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code_str(), "TT_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_check_invalid_config() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.json");
        fs::write(&config_path, r#"{ "app": { "providers": [] } }"#).unwrap();

        let err = check(&config_path).unwrap_err();
        assert!(err.message().contains("providers"));
    }
}
