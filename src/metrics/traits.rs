//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting* and *export* into small traits so
//! the intern tables and factories only ever write counters.
//!
//! ```text
//!   ┌─────────────────────────────┐      ┌──────────────────────────────┐
//!   │   InternMetricsRecorder     │      │   FactoryMetricsRecorder     │
//!   │  intern hit/miss, lookups   │      │  created/rejected/removed    │
//!   └──────────────┬──────────────┘      └───────────────┬──────────────┘
//!                  │                                     │
//!                  ▼                                     ▼
//!      InternTable / ScanInternTable /         ContextFactory /
//!      ConcurrentInternTable                   ConcurrentContextFactory
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Every recorder method takes `&self`: counters are relaxed atomics, so the
//! read path of a concurrent table can record without a write lock.

/// Counters for interning.
pub trait InternMetricsRecorder {
    /// `intern` found an existing canonical value.
    fn record_intern_hit(&self);
    /// `intern` created a new canonical value.
    fn record_intern_miss(&self);
    fn record_lookup_call(&self);
    fn record_lookup_hit(&self);
}

/// Counters for context creation.
pub trait FactoryMetricsRecorder {
    fn record_context_created(&self);
    fn record_context_rejected(&self);
    fn record_context_removed(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
