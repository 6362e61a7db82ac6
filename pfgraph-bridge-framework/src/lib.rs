//! pfgraph Bridge Framework
//!
//! Common abstractions for building bridges that ship counters to Carbon.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for running one collect-and-send cycle
//! - [`CarbonSender`] for delivering metrics over TCP with length-prefixed framing
//! - [`Collector`] trait implemented by each bridge's data source
//! - [`BridgeArgs`] for common CLI argument parsing
//! - [`CycleReport`] for standardized cycle reporting
//!
//! # Example
//!
//! ```ignore
//! use pfgraph_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let args = Cli::parse().bridge;
//!     let config = MyBridgeConfig::load_or_default(args.config.as_deref())?;
//!
//!     let runner = BridgeRunner::new_with_args("mybridge", config, &args)?;
//!     runner.run_once(&my_collector).await?;
//!     Ok(())
//! }
//! ```

mod args;
mod collector;
mod config;
mod error;
mod report;
mod runner;
mod sender;

pub use args::BridgeArgs;
pub use collector::Collector;
pub use config::{BridgeConfig, validate_carbon};
pub use error::{BridgeError, Result};
pub use report::CycleReport;
pub use runner::BridgeRunner;
pub use sender::CarbonSender;

// Re-export commonly used types from pfgraph-common
pub use pfgraph_common::{CarbonConfig, Format, LogFormat, LoggingConfig, MetricPoint};
