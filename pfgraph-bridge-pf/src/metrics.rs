//! Mapping from published metric names to record fields.

use std::collections::BTreeMap;

use crate::status::FieldValue;

/// Metrics published by default, as `(metric name, record field)`.
pub const WANTED_METRICS: &[(&str, &str)] = &[
    ("states.current", "state_current"),
    ("states.searches", "state_search"),
    ("states.inserts", "state_insert"),
    ("states.removes", "state_remove"),
    ("bytes.out", "bytes_out"),
    ("bytes.in", "bytes_in"),
    ("packets.in.blocked", "packets_in_blocked"),
    ("packets.in.passed", "packets_in"),
    ("packets.out.blocked", "packets_out_blocked"),
    ("packets.out.passed", "packets_out"),
];

/// Anything that exposes named fields.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Derives a value from a whole record.
pub type ComputedMetric = fn(&dyn FieldSource) -> Option<u64>;

/// Where one metric's value comes from.
#[derive(Debug, Clone)]
pub enum MetricSource {
    /// A numeric record field, by name.
    Field(String),
    /// A value computed from several fields.
    Computed(ComputedMetric),
}

impl PartialEq for MetricSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetricSource::Field(a), MetricSource::Field(b)) => a == b,
            (MetricSource::Computed(a), MetricSource::Computed(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for MetricSource {}

/// Ordered table of metric name to value source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    entries: BTreeMap<String, MetricSource>,
}

impl Default for MetricSpec {
    fn default() -> Self {
        Self::from_pairs(WANTED_METRICS.iter().copied())
    }
}

impl MetricSpec {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(metric, field)| (metric.to_string(), MetricSource::Field(field.to_string())))
                .collect(),
        }
    }

    pub fn from_map(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(metric, field)| (metric, MetricSource::Field(field)))
                .collect(),
        }
    }

    /// Add or replace a computed metric.
    pub fn with_computed(mut self, metric: impl Into<String>, compute: ComputedMetric) -> Self {
        self.entries.insert(metric.into(), MetricSource::Computed(compute));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &MetricSource)> {
        self.entries.iter().map(|(m, s)| (m.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read every mapped field from `record`.
    ///
    /// Entries whose field is unknown or not numeric, and computed entries
    /// yielding `None`, are left out.
    pub fn evaluate<R: FieldSource>(&self, record: &R) -> BTreeMap<String, u64> {
        let mut values = BTreeMap::new();

        for (metric, source) in &self.entries {
            let field = match source {
                MetricSource::Field(field) => field,
                MetricSource::Computed(compute) => {
                    match compute(record) {
                        Some(value) => {
                            values.insert(metric.clone(), value);
                        }
                        None => tracing::debug!(metric = %metric, "Computed metric has no value, skipping"),
                    }
                    continue;
                }
            };

            match record.field(field).map(|v| v.as_u64()) {
                Some(Some(value)) => {
                    values.insert(metric.clone(), value);
                }
                Some(None) => {
                    tracing::debug!(metric = %metric, field = %field, "Field is not numeric, skipping");
                }
                None => {
                    tracing::debug!(metric = %metric, field = %field, "Unknown field, skipping");
                }
            }
        }

        values
    }
}

/// Values of every `spec` entry that `record` can answer.
pub fn named_metrics<R: FieldSource>(record: &R, spec: &MetricSpec) -> BTreeMap<String, u64> {
    spec.evaluate(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fields(Vec<(&'static str, u64)>);

    impl FieldSource for Fields {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            if name == "iface" {
                return Some(FieldValue::Bytes(b"em0"));
            }
            self.0
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| FieldValue::U64(*v))
        }
    }

    #[test]
    fn test_default_spec() {
        let spec = MetricSpec::default();
        assert_eq!(spec.len(), 10);
        assert!(spec.entries().any(|(m, s)| {
            m == "packets.in.passed" && *s == MetricSource::Field("packets_in".to_string())
        }));
    }

    #[test]
    fn test_evaluate_reads_mapped_fields() {
        let record = Fields(vec![("bytes_in", 10), ("bytes_out", 20)]);
        let spec = MetricSpec::from_pairs([("bytes.in", "bytes_in"), ("bytes.out", "bytes_out")]);

        let values = spec.evaluate(&record);
        assert_eq!(values.get("bytes.in"), Some(&10));
        assert_eq!(values.get("bytes.out"), Some(&20));
    }

    #[test]
    fn test_evaluate_skips_missing_and_non_numeric() {
        let record = Fields(vec![("bytes_in", 10)]);
        let spec = MetricSpec::from_pairs([
            ("bytes.in", "bytes_in"),
            ("gone", "no_such_field"),
            ("iface", "iface"),
        ]);

        let values = named_metrics(&record, &spec);
        assert_eq!(values.len(), 1);
        assert!(values.contains_key("bytes.in"));
    }

    fn bytes_total(record: &dyn FieldSource) -> Option<u64> {
        let value = |name| record.field(name).and_then(|v| v.as_u64());
        value("bytes_in")?.checked_add(value("bytes_out")?)
    }

    #[test]
    fn test_computed_metrics() {
        let spec = MetricSpec::from_pairs([("bytes.in", "bytes_in")])
            .with_computed("bytes.total", bytes_total);

        let values = named_metrics(&Fields(vec![("bytes_in", 10), ("bytes_out", 20)]), &spec);
        assert_eq!(values.get("bytes.in"), Some(&10));
        assert_eq!(values.get("bytes.total"), Some(&30));

        let partial = named_metrics(&Fields(vec![("bytes_in", 10)]), &spec);
        assert_eq!(partial.len(), 1);
        assert!(!partial.contains_key("bytes.total"));
    }

    #[test]
    fn test_empty_spec() {
        let spec = MetricSpec::from_map(BTreeMap::new());
        assert!(spec.is_empty());
        assert!(spec.evaluate(&Fields(vec![])).is_empty());
    }
}
