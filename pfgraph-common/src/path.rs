//! Graphite metric path construction.
//!
//! Paths follow the pattern `<hostname>.<namespace>.<metric>`, e.g.
//! `fw01.pf.states.current`.

/// Default namespace segment inserted between hostname and metric.
pub const DEFAULT_NAMESPACE: &str = "pf";

/// Builder for the metric paths of one host.
#[derive(Debug, Clone)]
pub struct MetricPathBuilder {
    hostname: String,
    namespace: String,
}

impl MetricPathBuilder {
    /// Create a builder using the default `pf` namespace.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::with_namespace(hostname, DEFAULT_NAMESPACE)
    }

    /// Create a builder with a custom namespace.
    pub fn with_namespace(hostname: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            namespace: namespace.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Build the full path for a metric.
    ///
    /// # Example
    /// ```
    /// use pfgraph_common::path::MetricPathBuilder;
    ///
    /// let builder = MetricPathBuilder::new("fw01");
    /// assert_eq!(builder.build("states.current"), "fw01.pf.states.current");
    /// ```
    pub fn build(&self, metric: &str) -> String {
        format!("{}.{}.{}", self.hostname, self.namespace, metric)
    }
}

/// Components of a metric path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMetricPath {
    pub hostname: String,
    pub namespace: String,
    pub metric: String,
}

/// Split a path built by [`MetricPathBuilder`] back into its parts.
///
/// Hostnames may contain dots, so the split happens at the first
/// `.<namespace>.` segment.
pub fn parse_metric_path(path: &str, namespace: &str) -> Option<ParsedMetricPath> {
    let separator = format!(".{}.", namespace);
    let at = path.find(&separator)?;
    let hostname = &path[..at];
    let metric = &path[at + separator.len()..];

    if hostname.is_empty() || metric.is_empty() {
        return None;
    }

    Some(ParsedMetricPath {
        hostname: hostname.to_string(),
        namespace: namespace.to_string(),
        metric: metric.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_namespace() {
        let builder = MetricPathBuilder::with_namespace("fw01", "firewall");
        assert_eq!(builder.build("bytes.in"), "fw01.firewall.bytes.in");
    }

    #[test]
    fn test_parse_roundtrip() {
        let builder = MetricPathBuilder::new("gw.example.org");
        let path = builder.build("packets.in.blocked");

        let parsed = parse_metric_path(&path, DEFAULT_NAMESPACE).unwrap();
        assert_eq!(parsed.hostname, "gw.example.org");
        assert_eq!(parsed.namespace, "pf");
        assert_eq!(parsed.metric, "packets.in.blocked");
    }

    #[test]
    fn test_parse_rejects_foreign_paths() {
        assert!(parse_metric_path("fw01.cpu.usage", "pf").is_none());
        assert!(parse_metric_path(".pf.states", "pf").is_none());
        assert!(parse_metric_path("fw01.pf.", "pf").is_none());
    }
}
