//! Structured logging setup.
//!
//! Builds a `tracing-subscriber` layer stack from [`TelemetryConfig`]:
//! plain formatted output for local development, JSON lines when running
//! in a container or when explicitly requested. Console output can be
//! disabled entirely (filter-only subscriber) for callers that only want
//! metrics.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard returned by [`init_logging`]. Holding it keeps the subscriber
/// installed; there is nothing to flush on drop, but the guard gives
/// callers a value to tie to their process lifetime, matching the shape
/// of the metrics handle.
pub struct LoggingGuard {
    _private: (),
}

/// Install a global `tracing` subscriber built from `config`.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    let fmt_layer = if !config.console_output {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(service = %config.service_name, "structured logging initialized");
    Ok(LoggingGuard { _private: () })
}
