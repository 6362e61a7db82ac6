use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::telemetry::MetricPoint;

/// Size of the big-endian length header that precedes a pickle payload.
pub const HEADER_LEN: usize = 4;

/// Carbon ingestion format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Length-prefixed pickle list (Carbon pickle receiver, port 2004).
    #[default]
    Pickle,

    /// One `path value timestamp` line per point (Carbon line receiver, port 2003).
    Plaintext,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pickle => "pickle",
            Format::Plaintext => "plaintext",
        }
    }

    /// Whether the payload travels behind a length header.
    pub fn is_framed(&self) -> bool {
        matches!(self, Format::Pickle)
    }
}

/// Encode a batch of points as a payload in the specified format.
pub fn encode_payload(points: &[MetricPoint], format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Pickle => {
            serde_pickle::to_vec(&points, serde_pickle::SerOptions::new().proto_v2())
                .map_err(Error::from)
        }
        Format::Plaintext => {
            let mut out = String::new();
            for point in points {
                // Writing to a String cannot fail.
                let _ = writeln!(out, "{} {} {}", point.path, point.value, point.timestamp);
            }
            Ok(out.into_bytes())
        }
    }
}

/// Decode a payload (without its header) back into points.
pub fn decode_payload(data: &[u8], format: Format) -> Result<Vec<MetricPoint>> {
    match format {
        Format::Pickle => {
            let value = serde_pickle::value_from_slice(data, serde_pickle::DeOptions::new())?;
            points_from_pickle(value)
        }
        Format::Plaintext => {
            let text = std::str::from_utf8(data)
                .map_err(|e| Error::Plaintext(format!("payload is not UTF-8: {}", e)))?;
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(parse_plaintext_line)
                .collect()
        }
    }
}

/// Walk an unpickled `[(path, (timestamp, value)), ...]` list.
///
/// Integers at or above 2^63 arrive as Python longs and are only reachable
/// through the generic value tree.
fn points_from_pickle(value: serde_pickle::Value) -> Result<Vec<MetricPoint>> {
    use serde_pickle::Value;

    fn sequence(value: Value, what: &str) -> Result<Vec<Value>> {
        match value {
            Value::List(items) | Value::Tuple(items) => Ok(items),
            other => Err(Error::PickleShape(format!("{} is {:?}", what, other))),
        }
    }

    fn pair(value: Value, what: &str) -> Result<(Value, Value)> {
        let mut items = sequence(value, what)?.into_iter();
        match (items.next(), items.next(), items.next()) {
            (Some(a), Some(b), None) => Ok((a, b)),
            _ => Err(Error::PickleShape(format!("{} is not a pair", what))),
        }
    }

    fn integer<T: std::str::FromStr + TryFrom<i64>>(value: Value, what: &str) -> Result<T> {
        let out_of_range = || Error::PickleShape(format!("{} is out of range", what));
        match value {
            Value::I64(v) => T::try_from(v).map_err(|_| out_of_range()),
            Value::Int(big) => big.to_string().parse().map_err(|_| out_of_range()),
            other => Err(Error::PickleShape(format!("{} is {:?}", what, other))),
        }
    }

    sequence(value, "payload")?
        .into_iter()
        .map(|item| {
            let (path, sample) = pair(item, "point")?;
            let path = match path {
                Value::String(s) => s,
                other => return Err(Error::PickleShape(format!("path is {:?}", other))),
            };
            let (timestamp, value) = pair(sample, "sample")?;
            Ok(MetricPoint::new(
                path,
                integer(timestamp, "timestamp")?,
                integer(value, "value")?,
            ))
        })
        .collect()
}

fn parse_plaintext_line(line: &str) -> Result<MetricPoint> {
    let mut parts = line.split_whitespace();
    let (Some(path), Some(value), Some(timestamp), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::Plaintext(format!("malformed line '{}'", line)));
    };

    let value = value
        .parse()
        .map_err(|e| Error::Plaintext(format!("bad value in '{}': {}", line, e)))?;
    let timestamp = timestamp
        .parse()
        .map_err(|e| Error::Plaintext(format!("bad timestamp in '{}': {}", line, e)))?;

    Ok(MetricPoint::new(path, timestamp, value))
}

/// Prefix a payload with its 4-byte big-endian length.
pub fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        Error::Frame(format!(
            "payload of {} bytes does not fit a 4-byte length header",
            payload.len()
        ))
    })?;

    let mut message = Vec::with_capacity(HEADER_LEN + payload.len());
    message.extend_from_slice(&len.to_be_bytes());
    message.extend_from_slice(payload);
    Ok(message)
}

/// Split the first complete frame off `buf`.
///
/// Returns the payload and whatever follows it, or `None` if `buf` does not
/// yet hold a whole frame.
pub fn split_frame(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let header: [u8; HEADER_LEN] = buf.get(..HEADER_LEN)?.try_into().ok()?;
    let end = HEADER_LEN.checked_add(u32::from_be_bytes(header) as usize)?;
    let payload = buf.get(HEADER_LEN..end)?;
    Some((payload, &buf[end..]))
}

/// Build the exact bytes to write to Carbon for `points`.
pub fn encode_message(points: &[MetricPoint], format: Format) -> Result<Vec<u8>> {
    let payload = encode_payload(points, format)?;
    if format.is_framed() {
        frame(&payload)
    } else {
        Ok(payload)
    }
}
