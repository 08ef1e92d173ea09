//! Hash-keyed intern table mapping shared-state values to canonical handles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         InternTable<S>                                  │
//! │                                                                         │
//! │   index: FxHashMap<Arc<S>, HandleId>      handles: Vec<SharedHandle<S>> │
//! │   ┌──────────────────────┬──────┐         ┌────┬────────────────────┐   │
//! │   │ Arc(30, "large")  ───┼─► #0 │ ──────► │ #0 │ Arc(30, "large")   │   │
//! │   │ Arc(25, "medium") ───┼─► #1 │ ──────► │ #1 │ Arc(25, "medium")  │   │
//! │   └──────────────────────┴──────┘         └────┴────────────────────┘   │
//! │            │                                         ▲                  │
//! │            └────────── same allocation ──────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! intern(v):  index.get(&v) ─► hit  ─► handles[id].clone()
//!                          └─► miss ─► Arc::new(v), push handle, index it
//! ```
//!
//! The index key and the stored handle share one `Arc`, so each distinct
//! value exists exactly once in memory no matter how many contexts hold it.
//!
//! ## Key Concepts
//!
//! - **Canonical handle**: equal values always resolve to the same
//!   allocation ([`SharedHandle::ptr_eq`]).
//! - **Append-only**: values are never removed; [`size`](InternTable::size)
//!   never decreases and ids are dense in first-seen order.
//! - **Precondition**: `S`'s `Hash` must agree with its `Eq`. A violation
//!   lets an equal value miss its bucket and get a second handle. That is a
//!   logic error: debug builds assert against it on every insert, and
//!   [`check_invariants`](InternTable::check_invariants) reports it.
//!
//! ## Example Usage
//!
//! ```
//! use internkit::ds::{InternTable, SharedHandle};
//!
//! let mut table = InternTable::new();
//! let large = table.intern("large");
//! let medium = table.intern("medium");
//! let again = table.intern("large");
//!
//! assert_eq!(table.size(), 2);
//! assert!(SharedHandle::ptr_eq(&large, &again));
//! assert!(!SharedHandle::ptr_eq(&large, &medium));
//! ```
//!
//! ## Snapshot and Replay
//!
//! ```
//! use internkit::ds::InternTable;
//!
//! let mut table = InternTable::new();
//! for tier in ["large", "medium", "large", "small"] {
//!     table.intern(tier.to_string());
//! }
//!
//! let snapshot = table.values();
//! let replayed: InternTable<String> = snapshot.into_iter().rev().collect();
//! assert_eq!(replayed.size(), 3);
//! assert!(replayed.contains(&"medium".to_string()));
//! ```
//!
//! ## Performance
//!
//! - `intern` / `get` / `contains`: O(1) average, plus one hash of `S`
//! - `resolve`: O(1)
//! - `check_invariants`: O(n²), meant for tests and debugging
//! - debug builds add an O(n) equality scan to every insert

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::handle::{HandleId, SharedHandle};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::InternMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::InternMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{InternMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
use crate::traits::Interner;

/// Append-only dedup table for values that are `Eq + Hash`.
pub struct InternTable<S> {
    index: FxHashMap<Arc<S>, HandleId>,
    handles: Vec<SharedHandle<S>>,
    #[cfg(feature = "metrics")]
    metrics: InternMetrics,
}

impl<S> InternTable<S>
where
    S: Eq + Hash,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty table with room for `capacity` distinct values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            handles: Vec::with_capacity(capacity),
            #[cfg(feature = "metrics")]
            metrics: InternMetrics::default(),
        }
    }

    /// Returns the canonical handle for `value`, inserting it if unseen.
    ///
    /// On a hit `value` is dropped and the table is left untouched.
    pub fn intern(&mut self, value: S) -> SharedHandle<S> {
        if let Some(handle) = self.probe(&value) {
            #[cfg(feature = "metrics")]
            self.metrics.record_intern_hit();
            return handle;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_intern_miss();
        self.insert_new(Arc::new(value))
    }

    /// Like [`intern`](Self::intern), but only clones `value` on a miss.
    pub fn intern_ref(&mut self, value: &S) -> SharedHandle<S>
    where
        S: Clone,
    {
        if let Some(handle) = self.probe(value) {
            #[cfg(feature = "metrics")]
            self.metrics.record_intern_hit();
            return handle;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_intern_miss();
        self.insert_new(Arc::new(value.clone()))
    }

    /// Returns the canonical handle for `value` without inserting.
    pub fn get(&self, value: &S) -> Option<SharedHandle<S>> {
        let found = self.probe(value);
        #[cfg(feature = "metrics")]
        self.record_lookup(found.is_some());
        found
    }

    /// Returns `true` if `value` has been interned.
    pub fn contains(&self, value: &S) -> bool {
        self.index.contains_key(value)
    }

    /// Runs every invariant check and reports the first failure.
    ///
    /// Checks that the index and the handle list agree one-to-one, that ids
    /// are dense, that each index key shares its handle's allocation, and
    /// that no two handles hold equal values. The last check compares values
    /// directly, so it also catches a `Hash` that disagrees with `Eq`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.handles.len() {
            return Err(InvariantError::new(format!(
                "index holds {} values but {} handles exist",
                self.index.len(),
                self.handles.len()
            )));
        }

        for (pos, handle) in self.handles.iter().enumerate() {
            if handle.id().index() != pos {
                return Err(InvariantError::new(format!(
                    "handle at position {} carries id {}",
                    pos,
                    handle.id()
                )));
            }
            match self.index.get_key_value(handle.value()) {
                Some((key, &id)) if id == handle.id() && handle.shares(key) => {},
                Some((_, &id)) => {
                    return Err(InvariantError::new(format!(
                        "value of handle {} is indexed as {}",
                        handle.id(),
                        id
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "value of handle {} is missing from the index",
                        handle.id()
                    )));
                },
            }
            if let Some(dup) = self.handles[..pos]
                .iter()
                .find(|earlier| earlier.value() == handle.value())
            {
                return Err(InvariantError::new(format!(
                    "handles {} and {} hold equal values",
                    dup.id(),
                    handle.id()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn probe(&self, value: &S) -> Option<SharedHandle<S>> {
        self.index
            .get(value)
            .map(|id| self.handles[id.index()].clone())
    }

    fn insert_new(&mut self, value: Arc<S>) -> SharedHandle<S> {
        debug_assert!(
            !self.handles.iter().any(|h| h.value() == &*value),
            "shared state Hash/Eq contract violated: an equal value already has a handle"
        );
        let id = HandleId(self.handles.len());
        self.index.insert(Arc::clone(&value), id);
        let handle = SharedHandle::new(id, value);
        self.handles.push(handle.clone());
        trace!(
            handle = id.index(),
            distinct = self.handles.len(),
            "interned new shared state"
        );
        handle
    }

    #[cfg(feature = "metrics")]
    fn record_lookup(&self, hit: bool) {
        self.metrics.record_lookup_call();
        if hit {
            self.metrics.record_lookup_hit();
        }
    }

    #[cfg(all(feature = "metrics", feature = "concurrency"))]
    pub(crate) fn metrics(&self) -> &InternMetrics {
        &self.metrics
    }
}

impl<S> InternTable<S> {
    /// Number of distinct values interned. Never decreases.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Alias for [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle assigned `id`, if any.
    pub fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>> {
        self.handles.get(id.index()).cloned()
    }

    /// Iterates handles in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &SharedHandle<S>> {
        self.handles.iter()
    }

    /// Clones every interned value in first-seen order.
    ///
    /// Feed the result back through [`FromIterator`] or [`Extend`] to rebuild
    /// an equivalent table.
    pub fn values(&self) -> Vec<S>
    where
        S: Clone,
    {
        self.handles.iter().map(|h| h.value().clone()).collect()
    }
}

impl<S> Default for InternTable<S>
where
    S: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for InternTable<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternTable")
            .field("size", &self.handles.len())
            .field("handles", &self.handles)
            .finish()
    }
}

impl<S> Extend<S> for InternTable<S>
where
    S: Eq + Hash,
{
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.intern(value);
        }
    }
}

impl<S> FromIterator<S> for InternTable<S>
where
    S: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<S> Interner<S> for InternTable<S>
where
    S: Eq + Hash,
{
    fn intern(&mut self, value: S) -> SharedHandle<S> {
        InternTable::intern(self, value)
    }

    fn get(&self, value: &S) -> Option<SharedHandle<S>> {
        InternTable::get(self, value)
    }

    fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>> {
        InternTable::resolve(self, id)
    }

    fn size(&self) -> usize {
        InternTable::size(self)
    }

    fn contains(&self, value: &S) -> bool {
        InternTable::contains(self, value)
    }
}

#[cfg(feature = "metrics")]
impl<S> MetricsSnapshotProvider<InternMetricsSnapshot> for InternTable<S>
where
    S: Eq + Hash,
{
    fn snapshot(&self) -> InternMetricsSnapshot {
        self.metrics.snapshot(self.handles.len())
    }
}

#[cfg(feature = "metrics")]
impl<S> MetricsReset for InternTable<S>
where
    S: Eq + Hash,
{
    fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentInternTable;

#[cfg(feature = "concurrency")]
mod concurrent {
    use std::hash::Hash;

    use parking_lot::RwLock;

    use super::InternTable;
    use crate::ds::handle::{HandleId, SharedHandle};
    use crate::error::InvariantError;
    #[cfg(feature = "metrics")]
    use crate::metrics::snapshot::InternMetricsSnapshot;
    #[cfg(feature = "metrics")]
    use crate::metrics::traits::{InternMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
    use crate::traits::ConcurrentInterner;

    /// Thread-safe [`InternTable`] behind a `parking_lot::RwLock`.
    ///
    /// Hits are served under a shared lock. A miss takes the exclusive lock
    /// and re-runs lookup-or-insert, so two racing `intern` calls for the same
    /// unseen value still produce one canonical handle.
    #[derive(Debug)]
    pub struct ConcurrentInternTable<S> {
        inner: RwLock<InternTable<S>>,
    }

    impl<S> ConcurrentInternTable<S>
    where
        S: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::from_table(InternTable::new())
        }

        pub fn with_capacity(capacity: usize) -> Self {
            Self::from_table(InternTable::with_capacity(capacity))
        }

        /// Wraps an existing table, e.g. one rebuilt from a snapshot.
        pub fn from_table(table: InternTable<S>) -> Self {
            Self {
                inner: RwLock::new(table),
            }
        }

        pub fn intern(&self, value: S) -> SharedHandle<S> {
            {
                let table = self.inner.read();
                if let Some(handle) = table.probe(&value) {
                    #[cfg(feature = "metrics")]
                    table.metrics().record_intern_hit();
                    return handle;
                }
            }
            let mut table = self.inner.write();
            table.intern(value)
        }

        pub fn get(&self, value: &S) -> Option<SharedHandle<S>> {
            let table = self.inner.read();
            table.get(value)
        }

        pub fn contains(&self, value: &S) -> bool {
            let table = self.inner.read();
            table.contains(value)
        }

        pub fn check_invariants(&self) -> Result<(), InvariantError> {
            let table = self.inner.read();
            table.check_invariants()
        }

        /// Runs `f` against a consistent view of the table.
        pub fn with_table<R>(&self, f: impl FnOnce(&InternTable<S>) -> R) -> R {
            let table = self.inner.read();
            f(&table)
        }

        pub fn into_inner(self) -> InternTable<S> {
            self.inner.into_inner()
        }
    }

    impl<S> ConcurrentInternTable<S> {
        pub fn size(&self) -> usize {
            let table = self.inner.read();
            table.size()
        }

        pub fn is_empty(&self) -> bool {
            let table = self.inner.read();
            table.is_empty()
        }

        pub fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>> {
            let table = self.inner.read();
            table.resolve(id)
        }

        pub fn values(&self) -> Vec<S>
        where
            S: Clone,
        {
            let table = self.inner.read();
            table.values()
        }
    }

    impl<S> Default for ConcurrentInternTable<S>
    where
        S: Eq + Hash,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S> ConcurrentInterner<S> for ConcurrentInternTable<S>
    where
        S: Eq + Hash + Send + Sync,
    {
        fn intern(&self, value: S) -> SharedHandle<S> {
            ConcurrentInternTable::intern(self, value)
        }

        fn get(&self, value: &S) -> Option<SharedHandle<S>> {
            ConcurrentInternTable::get(self, value)
        }

        fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>> {
            ConcurrentInternTable::resolve(self, id)
        }

        fn size(&self) -> usize {
            ConcurrentInternTable::size(self)
        }
    }

    #[cfg(feature = "metrics")]
    impl<S> MetricsSnapshotProvider<InternMetricsSnapshot> for ConcurrentInternTable<S>
    where
        S: Eq + Hash,
    {
        fn snapshot(&self) -> InternMetricsSnapshot {
            let table = self.inner.read();
            table.snapshot()
        }
    }

    #[cfg(feature = "metrics")]
    impl<S> MetricsReset for ConcurrentInternTable<S>
    where
        S: Eq + Hash,
    {
        fn reset_metrics(&self) {
            let table = self.inner.read();
            table.reset_metrics();
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: equal inputs always yield the identical handle
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_equal_values_share_handle(
            values in prop::collection::vec(0u16..64, 1..200)
        ) {
            let mut table = InternTable::new();
            let mut first_seen: std::collections::HashMap<u16, SharedHandle<u16>> =
                std::collections::HashMap::new();

            for v in values {
                let handle = table.intern(v);
                let canonical = first_seen.entry(v).or_insert_with(|| handle.clone());
                prop_assert!(SharedHandle::ptr_eq(canonical, &handle));
            }
        }

        /// Property: distinct inputs never share a handle
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_distinct_values_distinct_handles(
            a in any::<u32>(),
            b in any::<u32>()
        ) {
            prop_assume!(a != b);
            let mut table = InternTable::new();
            let ha = table.intern(a);
            let hb = table.intern(b);
            prop_assert!(!SharedHandle::ptr_eq(&ha, &hb));
            prop_assert_ne!(ha.id(), hb.id());
        }

        /// Property: size grows by one exactly on unseen values
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_size_monotonic(
            values in prop::collection::vec(any::<u8>(), 0..300)
        ) {
            let mut table = InternTable::new();
            let mut seen = std::collections::HashSet::new();

            for v in values {
                let before = table.size();
                table.intern(v);
                let expected = if seen.insert(v) { before + 1 } else { before };
                prop_assert_eq!(table.size(), expected);
            }
            prop_assert_eq!(table.size(), seen.len());
            prop_assert!(table.check_invariants().is_ok());
        }

        /// Property: re-interning the same value n times keeps size at 1
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_idempotent_reintern(value in ".{0,16}", n in 1usize..50) {
            let mut table = InternTable::new();
            for _ in 0..n {
                table.intern(value.clone());
                prop_assert_eq!(table.size(), 1);
            }
        }
    }
}
