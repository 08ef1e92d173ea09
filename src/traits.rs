//! # Interner Traits
//!
//! The seam between intern tables and the code that consumes canonical
//! handles (most notably [`ContextFactory`](crate::factory::ContextFactory)).
//!
//! ```text
//!   ┌─────────────────────────────┐        ┌──────────────────────────────┐
//!   │        Interner<S>          │        │   ConcurrentInterner<S>      │
//!   │  intern(&mut, S) → handle   │        │  intern(&, S) → handle       │
//!   │  get(&, &S) → Option<..>    │        │  get(&, &S) → Option<..>     │
//!   │  resolve(&, id)             │        │  resolve(&, id)              │
//!   │  size(&) → usize            │        │  size(&) → usize             │
//!   └──────────────┬──────────────┘        └───────────────┬──────────────┘
//!                  │                                       │
//!        ┌─────────┴──────────┐                            │
//!        ▼                    ▼                            ▼
//!   InternTable<S>     ScanInternTable<S>        ConcurrentInternTable<S>
//!   (S: Eq + Hash)     (S: Eq)                   (feature "concurrency")
//! ```
//!
//! ## Contract
//!
//! Every implementation must return the *identical* handle (see
//! [`SharedHandle::ptr_eq`]) for equal values, and `size()` must never
//! decrease. Implementations differ only in lookup cost.

use crate::ds::{HandleId, SharedHandle};

/// Single-owner interner.
pub trait Interner<S> {
    /// Returns the canonical handle for `value`, inserting it if unseen.
    fn intern(&mut self, value: S) -> SharedHandle<S>;

    /// Returns the canonical handle for `value` without inserting.
    fn get(&self, value: &S) -> Option<SharedHandle<S>>;

    /// Returns the handle assigned `id`, if any.
    fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>>;

    /// Number of distinct values interned.
    fn size(&self) -> usize;

    /// Returns `true` if nothing has been interned yet.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns `true` if `value` has been interned.
    fn contains(&self, value: &S) -> bool {
        self.get(value).is_some()
    }
}

/// Interner that can be shared across threads.
///
/// `intern` must make lookup-and-insert-if-absent atomic with respect to
/// other `intern` calls.
pub trait ConcurrentInterner<S>: Send + Sync {
    /// Returns the canonical handle for `value`, inserting it if unseen.
    fn intern(&self, value: S) -> SharedHandle<S>;

    /// Returns the canonical handle for `value` without inserting.
    fn get(&self, value: &S) -> Option<SharedHandle<S>>;

    /// Returns the handle assigned `id`, if any.
    fn resolve(&self, id: HandleId) -> Option<SharedHandle<S>>;

    /// Number of distinct values interned.
    fn size(&self) -> usize;

    /// Returns `true` if nothing has been interned yet.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
