//! Context factories: pair unique per-instance data with canonical shared state.
//!
//! ## Architecture
//!
//! ```text
//!   make_context(unique, shared)
//!          │
//!          ├─► validator(&unique) ──► Err ─► InvalidArgument (nothing interned)
//!          │
//!          ▼
//!   ┌──────────────────┐  intern(shared)  ┌─────────────────────┐
//!   │  ContextFactory  │ ───────────────► │ Interner<S>         │
//!   │                  │ ◄─────────────── │ (InternTable, ...)  │
//!   └────────┬─────────┘  SharedHandle<S> └─────────────────────┘
//!            │
//!            ▼
//!   Context { unique: U, shared: SharedHandle<S> } ──► ContextRegistry ──► ContextId
//! ```
//!
//! The factory owns its interner (injected at construction) and every context
//! it creates. Callers reach contexts through the returned [`ContextId`].
//! Only the unique half of a context is mutable; the shared half is a
//! read-only handle that any number of contexts may hold.
//!
//! ## Example Usage
//!
//! ```
//! use internkit::factory::ContextFactory;
//!
//! let mut factory = ContextFactory::new();
//! let tiers = [(30, "large"), (25, "medium"), (10, "small")];
//! let pizzas = ["margherita", "salami", "four cheese"];
//!
//! let orders: Vec<_> = pizzas
//!     .iter()
//!     .flat_map(|p| tiers.iter().map(move |t| (p.to_string(), *t)))
//!     .map(|(p, t)| factory.make_context(p, t))
//!     .collect();
//!
//! assert_eq!(orders.len(), 9);
//! assert_eq!(factory.created_count(), 9);
//! assert_eq!(factory.table().size(), 3);
//! ```
//!
//! ## Thread Safety
//!
//! - [`ContextFactory`] is single-owner (`&mut self` to create contexts).
//! - `ConcurrentContextFactory` (feature `concurrency`) shares an
//!   `Arc<ConcurrentInternTable<S>>` and guards its registry with a
//!   `parking_lot::RwLock`.

use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::ds::context_registry::{ContextId, ContextRegistry};
use crate::ds::handle::SharedHandle;
use crate::ds::intern_table::InternTable;
use crate::error::InvalidArgument;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::FactoryMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::FactoryMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{FactoryMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
use crate::traits::Interner;

/// Check run against unique state before a context is created.
pub type UniqueValidator<U> = Box<dyn Fn(&U) -> Result<(), InvalidArgument> + Send + Sync>;

/// Unique state bound to a canonical shared-state handle.
pub struct Context<U, S> {
    unique: U,
    shared: SharedHandle<S>,
}

impl<U, S> Context<U, S> {
    pub(crate) fn new(unique: U, shared: SharedHandle<S>) -> Self {
        Self { unique, shared }
    }

    /// Per-instance data owned by this context alone.
    pub fn unique(&self) -> &U {
        &self.unique
    }

    pub fn unique_mut(&mut self) -> &mut U {
        &mut self.unique
    }

    /// Canonical handle of the shared state.
    pub fn shared(&self) -> &SharedHandle<S> {
        &self.shared
    }

    /// The shared state value itself.
    pub fn shared_state(&self) -> &S {
        self.shared.value()
    }

    /// Returns `true` if both contexts reference the same shared instance.
    pub fn shares_state_with(&self, other: &Self) -> bool {
        SharedHandle::ptr_eq(&self.shared, &other.shared)
    }

    pub fn into_parts(self) -> (U, SharedHandle<S>) {
        (self.unique, self.shared)
    }
}

impl<U: fmt::Debug, S: fmt::Debug> fmt::Debug for Context<U, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("unique", &self.unique)
            .field("shared", &self.shared)
            .finish()
    }
}

/// Creates contexts that reuse canonical shared handles.
pub struct ContextFactory<U, S, T = InternTable<S>> {
    table: T,
    registry: ContextRegistry<Context<U, S>>,
    validator: Option<UniqueValidator<U>>,
    #[cfg(feature = "metrics")]
    metrics: FactoryMetrics,
}

impl<U, S> ContextFactory<U, S, InternTable<S>>
where
    S: Eq + Hash,
{
    /// Creates a factory over a fresh hash-keyed [`InternTable`].
    pub fn new() -> Self {
        Self::with_table(InternTable::new())
    }
}

impl<U, S> Default for ContextFactory<U, S, InternTable<S>>
where
    S: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<U, S, T> ContextFactory<U, S, T>
where
    T: Interner<S>,
{
    /// Creates a factory over `table`, which may already hold values.
    pub fn with_table(table: T) -> Self {
        Self::from_parts(table, ContextRegistry::new(), None)
    }

    pub(crate) fn from_parts(
        table: T,
        registry: ContextRegistry<Context<U, S>>,
        validator: Option<UniqueValidator<U>>,
    ) -> Self {
        Self {
            table,
            registry,
            validator,
            #[cfg(feature = "metrics")]
            metrics: FactoryMetrics::default(),
        }
    }

    /// Interns `shared`, binds it to `unique` and registers the new context.
    ///
    /// # Panics
    ///
    /// Panics if the factory's validator rejects `unique`. Use
    /// [`try_make_context`](Self::try_make_context) to handle that case.
    pub fn make_context(&mut self, unique: U, shared: S) -> ContextId {
        match self.try_make_context(unique, shared) {
            Ok(id) => id,
            Err(err) => panic!("invalid argument: {}", err),
        }
    }

    /// Fallible form of [`make_context`](Self::make_context).
    ///
    /// Validation runs before interning, so a rejected call leaves both the
    /// table and the registry unchanged.
    pub fn try_make_context(&mut self, unique: U, shared: S) -> Result<ContextId, InvalidArgument> {
        if let Some(validate) = &self.validator {
            if let Err(err) = validate(&unique) {
                debug!(reason = err.message(), "rejected unique state");
                #[cfg(feature = "metrics")]
                self.metrics.record_context_rejected();
                return Err(err);
            }
        }

        let handle = self.table.intern(shared);
        let shared_id = handle.id();
        let id = self.registry.insert(Context::new(unique, handle));
        #[cfg(feature = "metrics")]
        self.metrics.record_context_created();
        trace!(
            context = id.index(),
            shared = shared_id.index(),
            "created context"
        );
        Ok(id)
    }

    /// Number of contexts produced so far, removed ones included.
    pub fn created_count(&self) -> usize {
        self.registry.created()
    }

    /// Number of contexts still held by the factory.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn get(&self, id: ContextId) -> Option<&Context<U, S>> {
        self.registry.get(id)
    }

    pub fn get_mut(&mut self, id: ContextId) -> Option<&mut Context<U, S>> {
        self.registry.get_mut(id)
    }

    /// Hands the context to the caller. Its shared value stays interned.
    pub fn remove(&mut self, id: ContextId) -> Option<Context<U, S>> {
        let context = self.registry.remove(id)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_context_removed();
        Some(context)
    }

    /// Live contexts in creation order.
    pub fn contexts(&self) -> impl Iterator<Item = (ContextId, &Context<U, S>)> {
        self.registry.iter()
    }

    /// The interner backing this factory.
    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn into_parts(self) -> (T, ContextRegistry<Context<U, S>>) {
        (self.table, self.registry)
    }
}

impl<U, S, T> fmt::Debug for ContextFactory<U, S, T>
where
    T: Interner<S>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFactory")
            .field("created", &self.registry.created())
            .field("live", &self.registry.len())
            .field("distinct_shared", &self.table.size())
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

#[cfg(feature = "metrics")]
impl<U, S, T> MetricsSnapshotProvider<FactoryMetricsSnapshot> for ContextFactory<U, S, T>
where
    T: Interner<S>,
{
    fn snapshot(&self) -> FactoryMetricsSnapshot {
        self.metrics
            .snapshot(self.registry.len(), self.table.size())
    }
}

#[cfg(feature = "metrics")]
impl<U, S, T> MetricsReset for ContextFactory<U, S, T>
where
    T: Interner<S>,
{
    fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentContextFactory;

#[cfg(feature = "concurrency")]
mod concurrent {
    use std::fmt;
    use std::hash::Hash;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::RwLock;
    use tracing::{debug, trace};

    use super::{Context, UniqueValidator};
    use crate::ds::context_registry::{ContextId, ContextRegistry};
    use crate::ds::intern_table::ConcurrentInternTable;
    use crate::error::InvalidArgument;
    #[cfg(feature = "metrics")]
    use crate::metrics::metrics_impl::FactoryMetrics;
    #[cfg(feature = "metrics")]
    use crate::metrics::snapshot::FactoryMetricsSnapshot;
    #[cfg(feature = "metrics")]
    use crate::metrics::traits::{FactoryMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
    use crate::traits::ConcurrentInterner;

    /// Thread-safe context factory over a shared concurrent interner.
    ///
    /// Several factories may share one table; each keeps its own registry.
    pub struct ConcurrentContextFactory<U, S, T = ConcurrentInternTable<S>> {
        table: Arc<T>,
        registry: RwLock<ContextRegistry<Context<U, S>>>,
        created: AtomicUsize,
        validator: Option<UniqueValidator<U>>,
        #[cfg(feature = "metrics")]
        metrics: FactoryMetrics,
    }

    impl<U, S> ConcurrentContextFactory<U, S, ConcurrentInternTable<S>>
    where
        S: Eq + Hash + Send + Sync,
    {
        pub fn new() -> Self {
            Self::with_table(Arc::new(ConcurrentInternTable::new()))
        }
    }

    impl<U, S> Default for ConcurrentContextFactory<U, S, ConcurrentInternTable<S>>
    where
        S: Eq + Hash + Send + Sync,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<U, S, T> ConcurrentContextFactory<U, S, T>
    where
        T: ConcurrentInterner<S>,
    {
        pub fn with_table(table: Arc<T>) -> Self {
            Self::from_parts(table, ContextRegistry::new(), None)
        }

        pub(crate) fn from_parts(
            table: Arc<T>,
            registry: ContextRegistry<Context<U, S>>,
            validator: Option<UniqueValidator<U>>,
        ) -> Self {
            Self {
                created: AtomicUsize::new(registry.created()),
                table,
                registry: RwLock::new(registry),
                validator,
                #[cfg(feature = "metrics")]
                metrics: FactoryMetrics::default(),
            }
        }

        /// # Panics
        ///
        /// Panics if the factory's validator rejects `unique`.
        pub fn make_context(&self, unique: U, shared: S) -> ContextId {
            match self.try_make_context(unique, shared) {
                Ok(id) => id,
                Err(err) => panic!("invalid argument: {}", err),
            }
        }

        pub fn try_make_context(&self, unique: U, shared: S) -> Result<ContextId, InvalidArgument> {
            if let Some(validate) = &self.validator {
                if let Err(err) = validate(&unique) {
                    debug!(reason = err.message(), "rejected unique state");
                    #[cfg(feature = "metrics")]
                    self.metrics.record_context_rejected();
                    return Err(err);
                }
            }

            // Intern outside the registry lock; the table has its own guard.
            let handle = self.table.intern(shared);
            let shared_id = handle.id();
            let id = {
                let mut registry = self.registry.write();
                let id = registry.insert(Context::new(unique, handle));
                self.created.fetch_add(1, Ordering::Release);
                id
            };
            #[cfg(feature = "metrics")]
            self.metrics.record_context_created();
            trace!(
                context = id.index(),
                shared = shared_id.index(),
                "created context"
            );
            Ok(id)
        }

        /// Contexts produced so far; read without taking the registry lock.
        pub fn created_count(&self) -> usize {
            self.created.load(Ordering::Acquire)
        }

        pub fn len(&self) -> usize {
            let registry = self.registry.read();
            registry.len()
        }

        pub fn is_empty(&self) -> bool {
            let registry = self.registry.read();
            registry.is_empty()
        }

        pub fn get_with<R>(&self, id: ContextId, f: impl FnOnce(&Context<U, S>) -> R) -> Option<R> {
            let registry = self.registry.read();
            registry.get(id).map(f)
        }

        pub fn get_mut_with<R>(
            &self,
            id: ContextId,
            f: impl FnOnce(&mut Context<U, S>) -> R,
        ) -> Option<R> {
            let mut registry = self.registry.write();
            registry.get_mut(id).map(f)
        }

        pub fn remove(&self, id: ContextId) -> Option<Context<U, S>> {
            let context = {
                let mut registry = self.registry.write();
                registry.remove(id)?
            };
            #[cfg(feature = "metrics")]
            self.metrics.record_context_removed();
            Some(context)
        }

        /// Visits live contexts in creation order under a shared lock.
        pub fn for_each(&self, mut f: impl FnMut(ContextId, &Context<U, S>)) {
            let registry = self.registry.read();
            for (id, context) in registry.iter() {
                f(id, context);
            }
        }

        pub fn table(&self) -> &Arc<T> {
            &self.table
        }

        pub fn into_parts(self) -> (Arc<T>, ContextRegistry<Context<U, S>>) {
            (self.table, self.registry.into_inner())
        }
    }

    impl<U, S, T> fmt::Debug for ConcurrentContextFactory<U, S, T>
    where
        T: ConcurrentInterner<S>,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("ConcurrentContextFactory")
                .field("created", &self.created_count())
                .field("distinct_shared", &self.table.size())
                .field("validated", &self.validator.is_some())
                .finish()
        }
    }

    #[cfg(feature = "metrics")]
    impl<U, S, T> MetricsSnapshotProvider<FactoryMetricsSnapshot> for ConcurrentContextFactory<U, S, T>
    where
        T: ConcurrentInterner<S>,
    {
        fn snapshot(&self) -> FactoryMetricsSnapshot {
            self.metrics.snapshot(self.len(), self.table.size())
        }
    }

    #[cfg(feature = "metrics")]
    impl<U, S, T> MetricsReset for ConcurrentContextFactory<U, S, T>
    where
        T: ConcurrentInterner<S>,
    {
        fn reset_metrics(&self) {
            self.metrics.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::ScanInternTable;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Tier {
        diameter: u32,
        label: &'static str,
    }

    const TIERS: [Tier; 3] = [
        Tier {
            diameter: 30,
            label: "large",
        },
        Tier {
            diameter: 25,
            label: "medium",
        },
        Tier {
            diameter: 10,
            label: "small",
        },
    ];

    #[test]
    fn three_by_three_orders_share_three_tiers() {
        let mut factory = ContextFactory::new();
        let mut ids = Vec::new();
        for pizza in ["margherita", "salami", "four cheese"] {
            for tier in &TIERS {
                ids.push(factory.make_context(pizza.to_string(), tier.clone()));
            }
        }

        assert_eq!(factory.created_count(), 9);
        assert_eq!(factory.len(), 9);
        assert_eq!(factory.table().size(), 3);

        // Same tier column → same handle.
        let first = factory.get(ids[0]).unwrap();
        let fourth = factory.get(ids[3]).unwrap();
        let second = factory.get(ids[1]).unwrap();
        assert!(first.shares_state_with(fourth));
        assert!(!first.shares_state_with(second));
        assert_eq!(fourth.unique(), "salami");
        assert_eq!(fourth.shared_state().label, "large");
    }

    #[test]
    fn mutating_unique_state_is_isolated() {
        let mut factory = ContextFactory::new();
        let a = factory.make_context(vec!["basil"], TIERS[0].clone());
        let b = factory.make_context(vec!["basil"], TIERS[0].clone());

        factory.get_mut(a).unwrap().unique_mut().push("extra cheese");

        let ctx_a = factory.get(a).unwrap();
        let ctx_b = factory.get(b).unwrap();
        assert_eq!(ctx_a.unique(), &vec!["basil", "extra cheese"]);
        assert_eq!(ctx_b.unique(), &vec!["basil"]);
        assert!(ctx_a.shares_state_with(ctx_b));
    }

    #[test]
    fn removing_a_context_keeps_the_shared_value() {
        let mut factory = ContextFactory::new();
        let a = factory.make_context(1u32, TIERS[1].clone());
        let b = factory.make_context(2u32, TIERS[1].clone());

        let removed = factory.remove(a).unwrap();
        let (unique, handle) = removed.into_parts();
        assert_eq!(unique, 1);
        drop(handle);

        assert!(factory.get(a).is_none());
        assert!(factory.remove(a).is_none());
        assert_eq!(factory.len(), 1);
        assert_eq!(factory.created_count(), 2);
        assert_eq!(factory.table().size(), 1);
        assert!(factory.table().contains(&TIERS[1]));
        assert_eq!(factory.get(b).unwrap().shared_state().diameter, 25);
    }

    #[test]
    fn contexts_iterate_in_creation_order() {
        let mut factory = ContextFactory::new();
        for (i, tier) in TIERS.iter().enumerate() {
            factory.make_context(i, tier.clone());
        }
        let order: Vec<_> = factory.contexts().map(|(_, c)| *c.unique()).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn works_over_scan_table() {
        let mut factory: ContextFactory<&str, Tier, _> =
            ContextFactory::with_table(ScanInternTable::new());
        factory.make_context("a", TIERS[0].clone());
        factory.make_context("b", TIERS[0].clone());
        factory.make_context("c", TIERS[2].clone());
        assert_eq!(factory.created_count(), 3);
        assert_eq!(factory.table().size(), 2);

        let (table, registry) = factory.into_parts();
        assert_eq!(table.size(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn factory_over_prefilled_table_reuses_its_handles() {
        let mut table = InternTable::new();
        let large = table.intern(TIERS[0].clone());
        let mut factory = ContextFactory::with_table(table);
        let id = factory.make_context("order", TIERS[0].clone());
        assert!(SharedHandle::ptr_eq(factory.get(id).unwrap().shared(), &large));
        assert_eq!(factory.table().size(), 1);
    }

    #[test]
    fn try_make_context_rejects_invalid_unique_state() {
        let validator: UniqueValidator<String> = Box::new(|s: &String| {
            if s.trim().is_empty() {
                Err(InvalidArgument::new("pizza name must not be blank"))
            } else {
                Ok(())
            }
        });
        let mut factory = ContextFactory::from_parts(
            InternTable::new(),
            ContextRegistry::new(),
            Some(validator),
        );

        let err = factory
            .try_make_context("  ".to_string(), TIERS[0].clone())
            .unwrap_err();
        assert_eq!(err.message(), "pizza name must not be blank");
        assert_eq!(factory.created_count(), 0);
        assert!(factory.table().is_empty());

        assert!(factory.try_make_context("salami".into(), TIERS[0].clone()).is_ok());
    }

    #[test]
    #[should_panic(expected = "invalid argument: empty")]
    fn make_context_panics_on_invalid_unique_state() {
        let validator: UniqueValidator<&str> = Box::new(|s: &&str| {
            if s.is_empty() {
                Err(InvalidArgument::new("empty"))
            } else {
                Ok(())
            }
        });
        let mut factory =
            ContextFactory::from_parts(InternTable::new(), ContextRegistry::new(), Some(validator));
        factory.make_context("", TIERS[0].clone());
    }

    #[test]
    fn debug_output_summarizes_counts() {
        let mut factory = ContextFactory::new();
        factory.make_context(1, 1u8);
        factory.make_context(2, 1u8);
        let dbg = format!("{:?}", factory);
        assert!(dbg.contains("created: 2"));
        assert!(dbg.contains("distinct_shared: 1"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_created_rejected_removed() {
        let validator: UniqueValidator<i32> = Box::new(|v: &i32| {
            if *v < 0 {
                Err(InvalidArgument::new("negative"))
            } else {
                Ok(())
            }
        });
        let mut factory =
            ContextFactory::from_parts(InternTable::new(), ContextRegistry::new(), Some(validator));
        let a = factory.make_context(1, "large");
        factory.make_context(2, "large");
        let _ = factory.try_make_context(-1, "small");
        factory.remove(a);

        let snap = factory.snapshot();
        assert_eq!(snap.contexts_created, 2);
        assert_eq!(snap.contexts_rejected, 1);
        assert_eq!(snap.contexts_removed, 1);
        assert_eq!(snap.live_contexts, 1);
        assert_eq!(snap.distinct_shared, 1);
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn concurrent_factory_basic_ops() {
        let factory = ConcurrentContextFactory::new();
        let a = factory.make_context("margherita".to_string(), TIERS[0].clone());
        let b = factory.make_context("salami".to_string(), TIERS[0].clone());

        assert_eq!(factory.created_count(), 2);
        assert_eq!(factory.table().size(), 1);
        let shared = factory
            .get_with(a, |ctx| ctx.shared().clone())
            .unwrap();
        assert!(factory.get_with(b, |ctx| SharedHandle::ptr_eq(ctx.shared(), &shared)).unwrap());

        factory.get_mut_with(a, |ctx| ctx.unique_mut().push_str(" +basil"));
        assert_eq!(
            factory.get_with(a, |ctx| ctx.unique().clone()).as_deref(),
            Some("margherita +basil")
        );
        assert_eq!(
            factory.get_with(b, |ctx| ctx.unique().clone()).as_deref(),
            Some("salami")
        );

        assert!(factory.remove(a).is_some());
        assert_eq!(factory.len(), 1);
        assert_eq!(factory.created_count(), 2);

        let mut seen = Vec::new();
        factory.for_each(|id, _| seen.push(id));
        assert_eq!(seen, vec![b]);
    }
}
