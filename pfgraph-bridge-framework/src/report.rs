//! Summary of one collection cycle.

use std::time::Duration;

/// What a completed cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Bridge name (e.g., "pf").
    pub bridge: String,
    /// Bridge version.
    pub version: String,
    /// `host:port` the metrics went to.
    pub target: String,
    /// Number of metric points sent.
    pub metrics: usize,
    /// Bytes written to the socket, header included.
    pub bytes_sent: usize,
    /// Wall time of collect + send.
    pub elapsed: Duration,
}

impl CycleReport {
    /// Emit the report as a single structured log line.
    pub fn log(&self) {
        tracing::info!(
            bridge = %self.bridge,
            version = %self.version,
            target_addr = %self.target,
            metrics = self.metrics,
            bytes = self.bytes_sent,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "Cycle complete"
        );
    }
}
