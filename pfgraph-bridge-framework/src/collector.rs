//! Collector seam between a bridge's data source and the runner.

use pfgraph_common::MetricPoint;

use crate::error::Result;

/// Source of one batch of metric points per cycle.
pub trait Collector {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Gather the points of one cycle.
    ///
    /// Any error ends the cycle; the runner sends nothing.
    fn collect(&self) -> Result<Vec<MetricPoint>>;
}
