//! internkit: shared-state interning (flyweight) tables and context factories.
//!
//! Many logical entities often carry the same immutable state: the size tier
//! of an order, the font of a glyph, the schema of a row. Interning keeps one
//! physical copy of each distinct value and hands out cheap handles to it.
//!
//! - [`ds::InternTable`]: hash-keyed lookup-or-insert by value equality.
//! - [`ds::ScanInternTable`]: the same contract for `Eq`-only values.
//! - [`factory::ContextFactory`]: binds unique per-instance data to a
//!   canonical handle and keeps every context it creates.
//!
//! ```
//! use internkit::prelude::*;
//!
//! let mut factory = ContextFactory::new();
//! let a = factory.make_context("margherita", (30, "large"));
//! let b = factory.make_context("salami", (30, "large"));
//!
//! let (a, b) = (factory.get(a).unwrap(), factory.get(b).unwrap());
//! assert!(a.shares_state_with(b));
//! assert_eq!(factory.table().size(), 1);
//! ```
//!
//! ## Features
//!
//! - `concurrency`: `ConcurrentInternTable` and `ConcurrentContextFactory`
//!   (`parking_lot` locks).
//! - `metrics`: hit/miss and context counters with Prometheus text export.
//! - `dhat-heap`: the `dhat_profile` heap-profiling binary.

pub mod builder;
pub mod ds;
pub mod error;
pub mod factory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod prelude;
pub mod traits;
