//! Fixed binary record layouts.
//!
//! A [`FieldLayout`] describes a C-style record as an ordered list of typed
//! slots. [`decode`] unpacks exactly [`FieldLayout::size`] bytes from the front
//! of a buffer into [`Value`]s and hands back whatever follows, so callers can
//! walk a stream of records.
//!
//! # Example
//!
//! ```
//! use pfgraph_common::layout::{ByteOrder, FieldLayout, FieldSpec, Value, decode};
//!
//! const HEADER: FieldLayout = FieldLayout::new(
//!     ByteOrder::Big,
//!     &[FieldSpec::u32(1), FieldSpec::bytes(4)],
//! );
//!
//! let decoded = decode(&HEADER, b"\x00\x00\x00\x2aabcdrest").unwrap();
//! assert_eq!(decoded.values, vec![Value::U32(42), Value::Bytes(b"abcd".to_vec())]);
//! assert_eq!(decoded.remaining, b"rest");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while sizing, decoding or encoding a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input is shorter than the layout requires.
    #[error("Buffer underflow: layout needs {needed} bytes, got {available}")]
    Underflow { needed: usize, available: usize },

    /// The layout itself (or the values fed to it) is inconsistent.
    #[error("Invalid layout: {0}")]
    Layout(String),
}

impl DecodeError {
    fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }
}

/// Byte order of the integer fields in a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Network order.
    Big,
    Little,
    /// Whatever the host uses (kernel structures).
    #[default]
    Native,
}

impl ByteOrder {
    /// Whether integers are stored most significant byte first.
    pub fn is_big_endian(self) -> bool {
        match self {
            ByteOrder::Big => true,
            ByteOrder::Little => false,
            ByteOrder::Native => cfg!(target_endian = "big"),
        }
    }
}

/// Kind of a single slot in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned 64-bit integer.
    U64,
    /// Unsigned 32-bit integer.
    U32,
    /// Fixed-length byte string, kept verbatim.
    Bytes(usize),
}

impl FieldKind {
    /// Width in bytes, or `None` when the kind has no usable width.
    pub fn width(self) -> Option<usize> {
        match self {
            FieldKind::U64 => Some(8),
            FieldKind::U32 => Some(4),
            FieldKind::Bytes(0) => None,
            FieldKind::Bytes(n) => Some(n),
        }
    }
}

/// A field kind repeated `count` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub count: usize,
}

impl FieldSpec {
    pub const fn new(kind: FieldKind, count: usize) -> Self {
        Self { kind, count }
    }

    /// `count` consecutive `u64` values.
    pub const fn u64(count: usize) -> Self {
        Self::new(FieldKind::U64, count)
    }

    /// `count` consecutive `u32` values.
    pub const fn u32(count: usize) -> Self {
        Self::new(FieldKind::U32, count)
    }

    /// A single byte string of `len` bytes.
    pub const fn bytes(len: usize) -> Self {
        Self::new(FieldKind::Bytes(len), 1)
    }

    fn width(&self, index: usize) -> Result<usize, DecodeError> {
        let width = self
            .kind
            .width()
            .ok_or_else(|| DecodeError::layout(format!("field {} has no defined width", index)))?;
        if self.count == 0 {
            return Err(DecodeError::layout(format!(
                "field {} has a zero repeat count",
                index
            )));
        }
        width
            .checked_mul(self.count)
            .ok_or_else(|| DecodeError::layout(format!("field {} size overflows", index)))
    }
}

/// Immutable description of a binary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    byte_order: ByteOrder,
    fields: &'static [FieldSpec],
}

impl FieldLayout {
    pub const fn new(byte_order: ByteOrder, fields: &'static [FieldSpec]) -> Self {
        Self { byte_order, fields }
    }

    /// Same fields, different integer byte order.
    pub const fn with_byte_order(self, byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            fields: self.fields,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Exact number of bytes one record occupies.
    pub fn size(&self) -> Result<usize, DecodeError> {
        self.fields
            .iter()
            .enumerate()
            .try_fold(0usize, |total, (index, field)| {
                let width = field.width(index)?;
                total
                    .checked_add(width)
                    .ok_or_else(|| DecodeError::layout("layout size overflows"))
            })
    }

    /// Check that every field has a width and a non-zero count.
    pub fn validate(&self) -> Result<(), DecodeError> {
        self.size().map(|_| ())
    }

    /// Number of values a decode of this layout produces.
    pub fn value_count(&self) -> usize {
        self.fields.iter().map(|f| f.count).sum()
    }

    /// Pack `values` into a buffer that [`decode`] turns back into the same values.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>, DecodeError> {
        let size = self.size()?;
        if values.len() != self.value_count() {
            return Err(DecodeError::layout(format!(
                "expected {} values, got {}",
                self.value_count(),
                values.len()
            )));
        }

        let big = self.byte_order.is_big_endian();
        let mut out = Vec::with_capacity(size);
        let mut values = values.iter();

        for (index, field) in self.fields.iter().enumerate() {
            for value in values.by_ref().take(field.count) {
                match (field.kind, value) {
                    (FieldKind::U64, Value::U64(v)) => {
                        out.extend_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() })
                    }
                    (FieldKind::U32, Value::U32(v)) => {
                        out.extend_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() })
                    }
                    (FieldKind::Bytes(len), Value::Bytes(b)) if b.len() == len => {
                        out.extend_from_slice(b)
                    }
                    (kind, value) => {
                        return Err(DecodeError::layout(format!(
                            "value {:?} does not fit field {} ({:?})",
                            value, index, kind
                        )));
                    }
                }
            }
        }

        Ok(out)
    }
}

/// One decoded slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U64(u64),
    U32(u32),
    Bytes(Vec<u8>),
}

impl Value {
    /// Numeric view of the value; byte strings have none.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            Value::U32(v) => Some(u64::from(*v)),
            Value::Bytes(_) => None,
        }
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<'a> {
    /// Decoded values in declaration order, followed by any extras.
    pub values: Vec<Value>,
    /// Bytes after the record.
    pub remaining: &'a [u8],
}

/// Decode one record from the front of `bytes`.
pub fn decode<'a>(layout: &FieldLayout, bytes: &'a [u8]) -> Result<Decoded<'a>, DecodeError> {
    decode_with(layout, bytes, std::iter::empty())
}

/// Decode one record and append `extra` values, unmodified, after the decoded ones.
///
/// Nothing is returned unless every field decodes.
pub fn decode_with<'a, I>(
    layout: &FieldLayout,
    bytes: &'a [u8],
    extra: I,
) -> Result<Decoded<'a>, DecodeError>
where
    I: IntoIterator<Item = Value>,
{
    let needed = layout.size()?;
    if bytes.len() < needed {
        return Err(DecodeError::Underflow {
            needed,
            available: bytes.len(),
        });
    }

    let (mut raw, remaining) = bytes.split_at(needed);
    let big = layout.byte_order.is_big_endian();
    let mut values = Vec::with_capacity(layout.value_count());

    for (index, field) in layout.fields.iter().enumerate() {
        let width = field.width(index)? / field.count;
        for _ in 0..field.count {
            let (head, tail) = raw.split_at(width);
            raw = tail;
            values.push(decode_slot(field.kind, head, big)?);
        }
    }

    values.extend(extra);
    Ok(Decoded { values, remaining })
}

fn decode_slot(kind: FieldKind, raw: &[u8], big: bool) -> Result<Value, DecodeError> {
    let mismatch = |_| DecodeError::layout(format!("{:?} slot of {} bytes", kind, raw.len()));
    Ok(match kind {
        FieldKind::U64 => {
            let b: [u8; 8] = raw.try_into().map_err(mismatch)?;
            Value::U64(if big {
                u64::from_be_bytes(b)
            } else {
                u64::from_le_bytes(b)
            })
        }
        FieldKind::U32 => {
            let b: [u8; 4] = raw.try_into().map_err(mismatch)?;
            Value::U32(if big {
                u32::from_be_bytes(b)
            } else {
                u32::from_le_bytes(b)
            })
        }
        FieldKind::Bytes(_) => Value::Bytes(raw.to_vec()),
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn field_spec() -> impl Strategy<Value = FieldSpec> {
        let kind = prop_oneof![
            Just(FieldKind::U64),
            Just(FieldKind::U32),
            (1usize..=20).prop_map(FieldKind::Bytes),
        ];
        (kind, 1usize..=4).prop_map(|(kind, count)| FieldSpec::new(kind, count))
    }

    fn byte_order() -> impl Strategy<Value = ByteOrder> {
        prop_oneof![
            Just(ByteOrder::Big),
            Just(ByteOrder::Little),
            Just(ByteOrder::Native)
        ]
    }

    /// A random layout plus one record's worth of random bytes for it.
    fn layout_and_record() -> impl Strategy<Value = (FieldLayout, Vec<u8>)> {
        (vec(field_spec(), 1..8), byte_order()).prop_flat_map(|(fields, order)| {
            let layout = FieldLayout::new(order, Box::leak(fields.into_boxed_slice()));
            let size = layout.size().unwrap();
            (Just(layout), vec(any::<u8>(), size))
        })
    }

    proptest! {
        #[test]
        fn test_decode_consumes_exactly_one_record(
            (layout, record) in layout_and_record(),
            tail in vec(any::<u8>(), 0..16),
        ) {
            let mut buf = record.clone();
            buf.extend_from_slice(&tail);

            let decoded = decode(&layout, &buf).unwrap();
            prop_assert_eq!(decoded.values.len(), layout.value_count());
            prop_assert_eq!(decoded.remaining, &tail[..]);
        }

        #[test]
        fn test_encode_inverts_decode((layout, record) in layout_and_record()) {
            let decoded = decode(&layout, &record).unwrap();
            prop_assert!(decoded.remaining.is_empty());

            let encoded = layout.encode(&decoded.values).unwrap();
            prop_assert_eq!(&encoded, &record);
            prop_assert_eq!(decode(&layout, &encoded).unwrap().values, decoded.values);
        }

        #[test]
        fn test_every_short_buffer_underflows((layout, record) in layout_and_record()) {
            let needed = record.len();
            for available in 0..needed {
                prop_assert_eq!(
                    decode(&layout, &record[..available]),
                    Err(DecodeError::Underflow { needed, available })
                );
            }
        }
    }
}
