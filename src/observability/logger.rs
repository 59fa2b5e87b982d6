//! Log subscriber setup
//!
//! - One log line = one event
//! - JSON output for production, human-readable output for terminals
//! - `RUST_LOG` overrides the configured default level

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Build the filter: `RUST_LOG` if set, else `default_level`
fn env_filter(default_level: &str) -> EnvFilter {
    let default = default_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);

    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}

/// Install the global subscriber.
///
/// With `enabled == false` nothing is installed and every event is dropped.
/// Calling this twice is an error reported by `tracing_subscriber`.
pub fn init_logging(
    enabled: bool,
    format: LogFormat,
    default_level: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    if !enabled {
        return Ok(());
    }

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(env_filter(default_level))
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_filter(env_filter(default_level))
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()
}
