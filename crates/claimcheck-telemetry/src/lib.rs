//! # claimcheck-telemetry
//!
//! Structured logging and Prometheus metrics for claim-check clients.
//! Distributed tracing export is out of scope here: this crate backs a
//! client library, not a long-running service with a trace collector to
//! export to, so it stops at `tracing`'s local subscriber and a metrics
//! registry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use claimcheck_telemetry::{TelemetryConfig, init_telemetry};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(config).expect("failed to init telemetry");
//! ```

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::LoggingGuard;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, BLOB_OPERATIONS,
    BLOB_PUT_DURATION, CLEANUP_FAILURES, LOCK_RENEWAL_FAILURES, MESSAGES_OFFLOADED,
    MESSAGES_RESOLVED, MESSAGES_SENT_INLINE,
};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("failed to initialize metrics: {0}")]
    MetricsInit(String),

    #[error("invalid telemetry configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics from one configuration.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active. Drop to release it.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}
