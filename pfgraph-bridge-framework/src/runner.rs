//! Bridge runner for one collection cycle.

use std::time::Instant;

use pfgraph_common::{LoggingConfig, init_tracing};

use crate::BridgeArgs;
use crate::collector::Collector;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::report::CycleReport;
use crate::sender::CarbonSender;

/// Bridge runner that drives a single collect-and-send cycle.
///
/// Handles:
/// - Logging initialization
/// - Carbon target resolution (CLI over config)
/// - Collecting and sending exactly once
///
/// # Example
///
/// ```ignore
/// use pfgraph_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let args = Cli::parse().bridge;
///     let config = MyBridgeConfig::load_or_default(args.config.as_deref())?;
///
///     let runner = BridgeRunner::new_with_args("mybridge", config, &args)?;
///     runner.run_once(&MyCollector::new()).await?;
///     Ok(())
/// }
/// ```
pub struct BridgeRunner<C: BridgeConfig> {
    /// Bridge name for logging and reports.
    name: String,
    /// Bridge version.
    version: String,
    /// The loaded configuration.
    config: C,
    /// Carbon sender.
    sender: CarbonSender,
}

impl<C: BridgeConfig> BridgeRunner<C> {
    /// Create a new bridge runner from CLI args.
    ///
    /// This will:
    /// 1. Initialize logging based on config (with optional CLI override)
    /// 2. Build the Carbon sender from the CLI host and the CLI or configured port
    pub fn new_with_args(name: impl Into<String>, config: C, args: &BridgeArgs) -> Result<Self> {
        let name = name.into();

        // Initialize logging with optional CLI override
        let log_config = match args.log_level {
            Some(ref level) => LoggingConfig {
                level: level.clone(),
                format: config.logging().format,
            },
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| BridgeError::config(e.to_string()))?;

        let port = args.port_or(config.carbon().port);
        let sender = CarbonSender::from_config(args.host.clone(), port, config.carbon());

        let runner = Self::from_parts(name, config, sender);
        tracing::info!(
            bridge = %runner.name,
            version = %runner.version,
            target_addr = %runner.sender.target(),
            "Starting bridge"
        );

        Ok(runner)
    }

    /// Assemble a runner without touching global logging state.
    pub fn from_parts(name: impl Into<String>, config: C, sender: CarbonSender) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            sender,
        }
    }

    /// Get the bridge name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Collect once and send the result.
    ///
    /// The first error aborts the cycle and is returned unchanged.
    pub async fn run_once<K: Collector>(&self, collector: &K) -> Result<CycleReport> {
        let started = Instant::now();

        let points = collector.collect()?;
        tracing::info!(
            bridge = %self.name,
            collector = collector.name(),
            metrics = points.len(),
            "Collected metrics"
        );
        for point in &points {
            tracing::debug!(
                path = %point.path,
                timestamp = point.timestamp,
                value = point.value,
                "Metric"
            );
        }

        let bytes_sent = self.sender.send(&points).await?;

        let report = CycleReport {
            bridge: self.name.clone(),
            version: self.version.clone(),
            target: self.sender.target(),
            metrics: points.len(),
            bytes_sent,
            elapsed: started.elapsed(),
        };
        report.log();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfgraph_common::{
        CarbonConfig, Format, MetricPoint, decode_payload, split_frame,
    };
    use serde::Deserialize;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[derive(Debug, Default, Deserialize)]
    struct TestConfig {
        #[serde(default)]
        carbon: CarbonConfig,
        #[serde(default)]
        logging: LoggingConfig,
    }

    impl BridgeConfig for TestConfig {
        fn carbon(&self) -> &CarbonConfig {
            &self.carbon
        }

        fn logging(&self) -> &LoggingConfig {
            &self.logging
        }
    }

    struct FixedCollector(Vec<MetricPoint>);

    impl Collector for FixedCollector {
        fn name(&self) -> &str {
            "fixed"
        }

        fn collect(&self) -> Result<Vec<MetricPoint>> {
            Ok(self.0.clone())
        }
    }

    struct FailingCollector;

    impl Collector for FailingCollector {
        fn name(&self) -> &str {
            "failing"
        }

        fn collect(&self) -> Result<Vec<MetricPoint>> {
            Err(BridgeError::device("permission denied"))
        }
    }

    #[tokio::test]
    async fn test_run_once_sends_collected_points() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let points = vec![MetricPoint::new("fw01.pf.states.current", 100, 3)];
        let runner = BridgeRunner::from_parts(
            "test",
            TestConfig::default(),
            CarbonSender::new("127.0.0.1", port, Format::Pickle),
        );

        let report = runner
            .run_once(&FixedCollector(points.clone()))
            .await
            .unwrap();
        assert_eq!(report.metrics, 1);
        assert_eq!(report.target, format!("127.0.0.1:{}", port));

        let received = server.await.unwrap();
        assert_eq!(received.len(), report.bytes_sent);
        let (payload, _) = split_frame(&received).unwrap();
        assert_eq!(decode_payload(payload, Format::Pickle).unwrap(), points);
    }

    #[tokio::test]
    async fn test_collect_error_stops_cycle() {
        // Nothing listens here; a send attempt would surface as Connection.
        let runner = BridgeRunner::from_parts(
            "test",
            TestConfig::default(),
            CarbonSender::new("127.0.0.1", 1, Format::Pickle),
        );

        let err = runner.run_once(&FailingCollector).await.unwrap_err();
        assert!(matches!(err, BridgeError::Device(_)));
    }
}
