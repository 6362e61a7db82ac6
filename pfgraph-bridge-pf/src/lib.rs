//! Carbon bridge for OpenBSD pf counters.
//!
//! This bridge reads `struct pf_status` from `/dev/pf` with the
//! `DIOCGETSTATUS` ioctl and ships a selection of its counters to Carbon.
//!
//! # Metric Paths
//!
//! ```text
//! <hostname>.pf.states.current
//! <hostname>.pf.states.searches
//! <hostname>.pf.bytes.in
//! <hostname>.pf.packets.in.blocked
//! <hostname>.pf.packets.out.passed
//! ```

pub mod collector;
pub mod config;
pub mod device;
pub mod metrics;
pub mod status;
