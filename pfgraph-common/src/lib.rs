//! pfgraph Common Library
//!
//! This crate provides shared types and utilities for pfgraph Carbon bridges:
//!
//! - [`telemetry`] - Metric data model (`MetricPoint`)
//! - [`layout`] - Fixed binary record layouts and the struct decoder
//! - [`serialization`] - Pickle/plaintext payloads and length-prefix framing
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`path`] - Graphite metric path builders and parsers
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod layout;
pub mod path;
pub mod serialization;
pub mod telemetry;

// Re-export commonly used types at the crate root
pub use config::{CarbonConfig, DEFAULT_CARBON_PORT, LogFormat, LoggingConfig, parse_config};
pub use error::{Error, Result};
pub use layout::{
    ByteOrder, DecodeError, Decoded, FieldKind, FieldLayout, FieldSpec, Value, decode,
    decode_with,
};
pub use path::{DEFAULT_NAMESPACE, MetricPathBuilder, ParsedMetricPath, parse_metric_path};
pub use serialization::{
    Format, HEADER_LEN, decode_payload, encode_message, encode_payload, frame, split_frame,
};
pub use telemetry::{MetricPoint, current_timestamp_secs};

/// Initialize tracing with the given configuration.
///
/// Output goes to stderr so that stdout stays free for command output.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// # Example
///
/// ```ignore
/// use pfgraph_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
