//! Optional interning and factory metrics (feature `metrics`).
//!
//! Recording is split from snapshotting and exporting, the same way the
//! table and factory types are split from their consumers:
//!
//! - [`traits`]: recorder, snapshot-provider, reset and exporter traits.
//! - [`metrics_impl`]: the counter structs embedded in tables and factories.
//! - [`snapshot`]: plain `Copy` snapshots handed to callers.
//! - [`exporter`]: Prometheus text exposition output.

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
