//! pf counter collection.

use pfgraph_bridge_framework::{Collector, MetricPoint, Result};
use pfgraph_common::{ByteOrder, MetricPathBuilder, current_timestamp_secs};

use crate::config::PfConfig;
use crate::device::DeviceStatusSource;
use crate::metrics::{MetricSpec, named_metrics};
use crate::status::{PfStatus, retrieve};

/// Collector turning one device status read into Carbon points.
pub struct PfCollector<S> {
    source: S,
    paths: MetricPathBuilder,
    spec: MetricSpec,
    byte_order: ByteOrder,
}

impl<S: DeviceStatusSource> PfCollector<S> {
    /// Create a collector with the settings from `config`.
    pub fn new(source: S, hostname: impl Into<String>, config: &PfConfig) -> Self {
        Self {
            source,
            paths: MetricPathBuilder::with_namespace(hostname, config.namespace.clone()),
            spec: config.metric_spec(),
            byte_order: config.byte_order,
        }
    }

    pub fn paths(&self) -> &MetricPathBuilder {
        &self.paths
    }

    pub fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    /// Read and decode the current status.
    pub fn retrieve(&self) -> Result<PfStatus> {
        retrieve(&self.source, self.byte_order)
    }

    /// Build points from a decoded status, all stamped with `timestamp`.
    pub fn points_from(&self, status: &PfStatus, timestamp: i64) -> Vec<MetricPoint> {
        named_metrics(status, &self.spec)
            .into_iter()
            .map(|(metric, value)| MetricPoint::new(self.paths.build(&metric), timestamp, value))
            .collect()
    }

    /// Retrieve the status and stamp every point with `timestamp`.
    pub fn collect_at(&self, timestamp: i64) -> Result<Vec<MetricPoint>> {
        let status = self.retrieve()?;
        Ok(self.points_from(&status, timestamp))
    }
}

impl<S: DeviceStatusSource> Collector for PfCollector<S> {
    fn name(&self) -> &str {
        "pf"
    }

    fn collect(&self) -> Result<Vec<MetricPoint>> {
        let status = self.retrieve()?;
        let timestamp = current_timestamp_secs();
        tracing::debug!(
            host = self.paths.hostname(),
            running = status.status != 0,
            states = status.state_current,
            "Retrieved pf status"
        );
        Ok(self.points_from(&status, timestamp))
    }
}
