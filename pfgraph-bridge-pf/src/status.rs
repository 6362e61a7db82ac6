//! The kernel `pf_status` record.
//!
//! Mirrors `struct pf_status` from OpenBSD's `sys/net/pfvar.h`:
//!
//! ```text
//! u_int64_t counters[PFRES_MAX];   /* 15 */
//! u_int64_t lcounters[LCNT_MAX];   /* 7, limit counters */
//! u_int64_t fcounters[FCNT_MAX];   /* 3 */
//! u_int64_t scounters[SCNT_MAX];   /* 3 */
//! u_int64_t pcounters[2][2][3];
//! u_int64_t bcounters[2][2];
//! u_int64_t stateid;
//! u_int32_t running, states, src_nodes, since, debug, hostid, reass;
//! char      ifname[IFNAMSIZ];      /* 16 */
//! u_int8_t  pf_chksum[PF_MD5_DIGEST_LENGTH]; /* 16 */
//! ```

use pfgraph_bridge_framework::Result;
use pfgraph_common::{ByteOrder, DecodeError, FieldLayout, FieldSpec, Value, decode};

use crate::device::{DIOCGETSTATUS, DeviceStatusSource};
use crate::metrics::{FieldSource, MetricSpec, named_metrics};

pub const PFRES_MAX: usize = 15;
pub const LCNT_MAX: usize = 7;
pub const FCNT_MAX: usize = 3;
pub const SCNT_MAX: usize = 3;
pub const IFNAMSIZ: usize = 16;
pub const PF_MD5_DIGEST_LENGTH: usize = 16;

const PF_STATUS_FIELDS: &[FieldSpec] = &[
    FieldSpec::u64(PFRES_MAX),
    FieldSpec::u64(LCNT_MAX),
    FieldSpec::u64(FCNT_MAX),
    FieldSpec::u64(SCNT_MAX),
    FieldSpec::u64(2 * 2 * 3),
    FieldSpec::u64(2 * 2),
    FieldSpec::u64(1),
    FieldSpec::u32(7),
    FieldSpec::bytes(IFNAMSIZ),
    FieldSpec::bytes(PF_MD5_DIGEST_LENGTH),
];

/// Binary layout of `struct pf_status`, in host byte order.
pub const PF_STATUS_LAYOUT: FieldLayout = FieldLayout::new(ByteOrder::Native, PF_STATUS_FIELDS);

/// Borrowed view of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    U64(u64),
    U32(u32),
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    /// Numeric value, if the field is a counter.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U64(v) => Some(*v),
            FieldValue::U32(v) => Some(u64::from(*v)),
            FieldValue::Bytes(_) => None,
        }
    }
}

/// Conversion between decoded values and record fields.
trait Slot: Sized {
    fn take<I: Iterator<Item = Value>>(values: &mut I, name: &str) -> Result<Self>;
    fn view(&self) -> FieldValue<'_>;
}

fn slot_mismatch(name: &str, found: Option<Value>) -> DecodeError {
    DecodeError::Layout(format!("field '{}' got {:?}", name, found))
}

impl Slot for u64 {
    fn take<I: Iterator<Item = Value>>(values: &mut I, name: &str) -> Result<Self> {
        match values.next() {
            Some(Value::U64(v)) => Ok(v),
            other => Err(slot_mismatch(name, other).into()),
        }
    }

    fn view(&self) -> FieldValue<'_> {
        FieldValue::U64(*self)
    }
}

impl Slot for u32 {
    fn take<I: Iterator<Item = Value>>(values: &mut I, name: &str) -> Result<Self> {
        match values.next() {
            Some(Value::U32(v)) => Ok(v),
            other => Err(slot_mismatch(name, other).into()),
        }
    }

    fn view(&self) -> FieldValue<'_> {
        FieldValue::U32(*self)
    }
}

impl Slot for Vec<u8> {
    fn take<I: Iterator<Item = Value>>(values: &mut I, name: &str) -> Result<Self> {
        match values.next() {
            Some(Value::Bytes(v)) => Ok(v),
            other => Err(slot_mismatch(name, other).into()),
        }
    }

    fn view(&self) -> FieldValue<'_> {
        FieldValue::Bytes(self)
    }
}

/// Declares the record once: struct, field names, and lookup by name.
macro_rules! status_record {
    ($( $(#[$doc:meta])* $name:ident : $ty:ty ),* $(,)?) => {
        /// Immutable snapshot of the pf counters.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct PfStatus {
            $( $(#[$doc])* pub $name: $ty, )*
        }

        impl PfStatus {
            /// Every field name, in layout order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($name)),*];

            fn from_values(values: Vec<Value>) -> Result<Self> {
                let mut values = values.into_iter();
                let status = Self {
                    $( $name: <$ty as Slot>::take(&mut values, stringify!($name))?, )*
                };
                if values.next().is_some() {
                    return Err(DecodeError::Layout(
                        "more decoded values than pf_status fields".to_string(),
                    )
                    .into());
                }
                Ok(status)
            }

            /// Look up a field by name.
            pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
                match name {
                    $( stringify!($name) => Some(Slot::view(&self.$name)), )*
                    _ => None,
                }
            }
        }
    };
}

status_record! {
    count_match: u64,
    count_bad_offset: u64,
    count_fragmented: u64,
    count_short: u64,
    count_normalized: u64,
    count_memory: u64,
    count_bad_timestamp: u64,
    count_congest: u64,
    count_ip_opts: u64,
    count_bad_checksum: u64,
    count_bad_state: u64,
    count_state_insert: u64,
    count_max_states: u64,
    count_max_source: u64,
    count_synproxy: u64,

    limit_state: u64,
    limit_source_state: u64,
    limit_source_node: u64,
    limit_source_conn: u64,
    limit_source_conn_rate: u64,
    overload_table_insert: u64,
    overload_flush_states: u64,

    state_search: u64,
    state_insert: u64,
    state_remove: u64,

    source_search: u64,
    source_insert: u64,
    source_remove: u64,

    packets_in: u64,
    packets_in_blocked: u64,
    packets_in_scrubbed: u64,
    packets_v6_in: u64,
    packets_v6_in_blocked: u64,
    packets_v6_in_scrubbed: u64,
    packets_out: u64,
    packets_out_blocked: u64,
    packets_out_scrubbed: u64,
    packets_v6_out: u64,
    packets_v6_out_blocked: u64,
    packets_v6_out_scrubbed: u64,

    bytes_in: u64,
    bytes_out: u64,
    bytes_v6_in: u64,
    bytes_v6_out: u64,

    stateid: u64,

    /// Non-zero while pf is enabled.
    status: u32,
    state_current: u32,
    source_current: u32,
    /// Seconds since epoch when pf was last enabled.
    since: u32,
    loglevel: u32,
    hostid: u32,
    reass: u32,

    /// Status interface name, NUL padded.
    iface: Vec<u8>,
    pf_checksum: Vec<u8>,
}

impl PfStatus {
    /// Decode a raw `pf_status` buffer in host byte order.
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        Self::from_raw_with_order(bytes, PF_STATUS_LAYOUT.byte_order())
    }

    /// Decode a raw `pf_status` buffer with an explicit byte order.
    pub fn from_raw_with_order(bytes: &[u8], order: ByteOrder) -> Result<Self> {
        let decoded = decode(&PF_STATUS_LAYOUT.with_byte_order(order), bytes)?;
        Self::from_values(decoded.values)
    }

    /// Fetch the current status from a device.
    pub fn retrieve<S: DeviceStatusSource + ?Sized>(source: &S, order: ByteOrder) -> Result<Self> {
        let size = PF_STATUS_LAYOUT.size()?;
        let raw = source.read_status(DIOCGETSTATUS, size)?;
        Self::from_raw_with_order(&raw, order)
    }

    /// Every field with its value, in layout order.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        Self::FIELD_NAMES
            .iter()
            .filter_map(|name| self.field(name).map(|value| (*name, value)))
            .collect()
    }

    /// Values of the default wanted metrics.
    pub fn named_metrics(&self) -> std::collections::BTreeMap<String, u64> {
        named_metrics(self, &MetricSpec::default())
    }

    /// Interface name up to the first NUL.
    pub fn interface_name(&self) -> String {
        let end = self
            .iface
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(self.iface.len());
        String::from_utf8_lossy(&self.iface[..end]).into_owned()
    }

    /// Ruleset checksum as lowercase hex.
    pub fn checksum_hex(&self) -> String {
        self.pf_checksum.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// JSON object with every field, for dumping.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in self.fields() {
            let json = match value {
                FieldValue::U64(v) => serde_json::Value::from(v),
                FieldValue::U32(v) => serde_json::Value::from(v),
                FieldValue::Bytes(_) if name == "iface" => self.interface_name().into(),
                FieldValue::Bytes(_) => self.checksum_hex().into(),
            };
            map.insert(name.to_string(), json);
        }
        serde_json::Value::Object(map)
    }
}

/// Read and decode the status from `source`.
pub fn retrieve<S: DeviceStatusSource + ?Sized>(source: &S, order: ByteOrder) -> Result<PfStatus> {
    PfStatus::retrieve(source, order)
}

impl FieldSource for PfStatus {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        PfStatus::field(self, name)
    }
}
