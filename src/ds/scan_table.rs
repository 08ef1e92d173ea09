//! Linear-scan intern table for values that are `Eq` but not `Hash`.
//!
//! Every `intern` walks the list of canonical values and compares by `==`.
//! That is O(n) in the number of *distinct* values, which stays cheap as long
//! as few distinct shared states exist relative to the contexts using them.
//! Observable behavior matches [`InternTable`](crate::ds::InternTable) exactly;
//! prefer that table whenever `S: Hash` is available.
//!
//! ```
//! use internkit::ds::{ScanInternTable, SharedHandle};
//!
//! // f64 is not Hash, so the hash-keyed table cannot hold it.
//! #[derive(Debug, PartialEq)]
//! struct Crust { thickness_mm: f64 }
//! impl Eq for Crust {}
//!
//! let mut table = ScanInternTable::new();
//! let thin = table.intern(Crust { thickness_mm: 2.5 });
//! let again = table.intern(Crust { thickness_mm: 2.5 });
//! assert!(SharedHandle::ptr_eq(&thin, &again));
//! assert_eq!(table.size(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

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

/// Append-only dedup table using equality scans.
pub struct ScanInternTable<S> {
    handles: Vec<SharedHandle<S>>,
    #[cfg(feature = "metrics")]
    metrics: InternMetrics,
}

impl<S> ScanInternTable<S>
where
    S: Eq,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
            #[cfg(feature = "metrics")]
            metrics: InternMetrics::default(),
        }
    }

    /// Returns the canonical handle for `value`, inserting it if unseen.
    pub fn intern(&mut self, value: S) -> SharedHandle<S> {
        if let Some(handle) = self.scan(&value) {
            #[cfg(feature = "metrics")]
            self.metrics.record_intern_hit();
            return handle.clone();
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_intern_miss();
        let id = HandleId(self.handles.len());
        let handle = SharedHandle::new(id, Arc::new(value));
        self.handles.push(handle.clone());
        trace!(
            handle = id.index(),
            distinct = self.handles.len(),
            "interned new shared state (scan)"
        );
        handle
    }

    pub fn get(&self, value: &S) -> Option<SharedHandle<S>> {
        let found = self.scan(value).cloned();
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_lookup_call();
            if found.is_some() {
                self.metrics.record_lookup_hit();
            }
        }
        found
    }

    pub fn contains(&self, value: &S) -> bool {
        self.scan(value).is_some()
    }

    /// Checks that ids are dense and that no two handles hold equal values.
    ///
    /// O(n²); meant for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (pos, handle) in self.handles.iter().enumerate() {
            if handle.id().index() != pos {
                return Err(InvariantError::new(format!(
                    "handle at position {} carries id {}",
                    pos,
                    handle.id()
                )));
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

    fn scan(&self, value: &S) -> Option<&SharedHandle<S>> {
        self.handles.iter().find(|h| h.value() == value)
    }
}

impl<S> ScanInternTable<S> {
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>> {
        self.handles.get(id.index()).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedHandle<S>> {
        self.handles.iter()
    }

    pub fn values(&self) -> Vec<S>
    where
        S: Clone,
    {
        self.handles.iter().map(|h| h.value().clone()).collect()
    }
}

impl<S: Eq> Default for ScanInternTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for ScanInternTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanInternTable")
            .field("size", &self.handles.len())
            .field("handles", &self.handles)
            .finish()
    }
}

impl<S: Eq> Extend<S> for ScanInternTable<S> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.intern(value);
        }
    }
}

impl<S: Eq> FromIterator<S> for ScanInternTable<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<S: Eq> Interner<S> for ScanInternTable<S> {
    fn intern(&mut self, value: S) -> SharedHandle<S> {
        ScanInternTable::intern(self, value)
    }

    fn get(&self, value: &S) -> Option<SharedHandle<S>> {
        ScanInternTable::get(self, value)
    }

    fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>> {
        ScanInternTable::resolve(self, id)
    }

    fn size(&self) -> usize {
        ScanInternTable::size(self)
    }

    fn contains(&self, value: &S) -> bool {
        ScanInternTable::contains(self, value)
    }
}

#[cfg(feature = "metrics")]
impl<S> MetricsSnapshotProvider<InternMetricsSnapshot> for ScanInternTable<S> {
    fn snapshot(&self) -> InternMetricsSnapshot {
        self.metrics.snapshot(self.handles.len())
    }
}

#[cfg(feature = "metrics")]
impl<S> MetricsReset for ScanInternTable<S> {
    fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::InternTable;

    #[test]
    fn large_medium_large_scenario() {
        let mut table = ScanInternTable::new();
        let first = table.intern(("tier", "large"));
        let second = table.intern(("tier", "medium"));
        let third = table.intern(("tier", "large"));

        assert_eq!(table.size(), 2);
        assert!(SharedHandle::ptr_eq(&first, &third));
        assert!(!SharedHandle::ptr_eq(&first, &second));
        assert!(!SharedHandle::ptr_eq(&second, &third));
    }

    #[test]
    fn get_contains_resolve() {
        let mut table = ScanInternTable::new();
        assert!(table.get(&1u8).is_none());
        let one = table.intern(1u8);
        table.intern(2u8);

        assert!(SharedHandle::ptr_eq(&table.get(&1).unwrap(), &one));
        assert!(table.contains(&2));
        assert!(!table.contains(&3));
        assert_eq!(table.resolve(HandleId(1)).map(|h| *h), Some(2));
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn assigns_same_ids_as_hash_table() {
        let input = [5, 3, 5, 9, 3, 1, 9];
        let mut scan = ScanInternTable::new();
        let mut hashed = InternTable::new();
        for v in input {
            assert_eq!(scan.intern(v).id(), hashed.intern(v).id());
        }
        assert_eq!(scan.values(), hashed.values());
    }

    #[test]
    fn invariants_hold_after_replay() {
        let table: ScanInternTable<_> = vec!["a", "b", "a", "c"].into_iter().collect();
        assert_eq!(table.size(), 3);
        assert!(table.check_invariants().is_ok());
    }

    #[test]
    fn check_invariants_flags_duplicates() {
        // Build a corrupt table by hand; intern() can never produce one.
        let table = ScanInternTable {
            handles: vec![
                SharedHandle::new(HandleId(0), Arc::new(7)),
                SharedHandle::new(HandleId(1), Arc::new(7)),
            ],
            #[cfg(feature = "metrics")]
            metrics: InternMetrics::default(),
        };
        let err = table.check_invariants().unwrap_err();
        assert!(err.message().contains("equal values"));
    }
}
