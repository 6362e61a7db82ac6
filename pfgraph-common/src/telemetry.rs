use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single timestamped metric as Carbon stores it.
///
/// On the wire a point is the tuple `(path, (timestamp, value))`, which is
/// what Carbon's pickle receiver unpacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricPoint {
    /// Dotted metric path (e.g., "fw01.pf.states.current").
    pub path: String,

    /// Unix epoch seconds when the measurement was taken.
    pub timestamp: i64,

    /// The measured value.
    pub value: u64,
}

impl MetricPoint {
    /// Create a new metric point.
    pub fn new(path: impl Into<String>, timestamp: i64, value: u64) -> Self {
        Self {
            path: path.into(),
            timestamp,
            value,
        }
    }
}

impl Serialize for MetricPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.path, (self.timestamp, self.value)).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetricPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (path, (timestamp, value)) = <(String, (i64, u64))>::deserialize(deserializer)?;
        Ok(Self {
            path,
            timestamp,
            value,
        })
    }
}

/// Get the current timestamp in seconds since Unix epoch.
pub fn current_timestamp_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
