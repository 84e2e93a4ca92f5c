//! Structured logging initialization
//!
//! Installs a JSON `tracing` subscriber filtered by `RUST_LOG`. Embedding
//! processes call [`init_logging`] once at startup; the compiler itself only
//! emits events and never installs a subscriber.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,ksvc=debug";

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line (e.g., "ksvc-deployer")
    pub service_name: String,

    /// Filter directive used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ksvc".to_string(),
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Build the env filter, preferring `RUST_LOG` over the configured default
fn build_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

/// Initialize JSON structured logging
///
/// # Example
///
/// ```ignore
/// use ksvc_common::telemetry::{init_logging, TelemetryConfig};
///
/// init_logging(TelemetryConfig {
///     service_name: "ksvc-deployer".to_string(),
///     ..Default::default()
/// })?;
/// ```
pub fn init_logging(config: TelemetryConfig) -> Result<(), TelemetryError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(build_filter(&config))
        .with(fmt_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::SubscriberInit(e.to_string())
        })?;

    tracing::info!(service = %config.service_name, "logging initialized");
    Ok(())
}
