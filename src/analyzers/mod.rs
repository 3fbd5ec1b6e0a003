//! Statistics and severity classification over record snapshots.
//!
//! Everything here is a pure function of its inputs: scalar aggregates over a
//! record set, per-period summaries, and the three-tier severity banding used
//! to colour regions on a map.

pub mod aggregate;
pub mod severity;
pub mod types;
pub mod utility;
