//! Canonical handles for interned shared state.
//!
//! A [`SharedHandle`] is what every intern table hands back: a cheap-to-clone
//! reference to the single physical copy of a shared-state value, tagged with
//! the dense [`HandleId`] the table assigned when it first saw the value.
//!
//! ## Identity vs. value equality
//!
//! Two handles are equal only when they point at the *same allocation*. Two
//! handles from different tables that wrap equal values are **not** equal.
//! This is the property callers rely on when they check that interning
//! actually deduplicated something.
//!
//! ```
//! use internkit::ds::{InternTable, SharedHandle};
//!
//! let mut table = InternTable::new();
//! let a = table.intern((30, "large"));
//! let b = table.intern((30, "large"));
//! assert!(SharedHandle::ptr_eq(&a, &b));
//!
//! let mut other = InternTable::new();
//! let c = other.intern((30, "large"));
//! assert_eq!(*a, *c);
//! assert!(!SharedHandle::ptr_eq(&a, &c));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Dense, table-local identifier of an interned value.
///
/// Ids are assigned in first-seen order starting at 0. They are only
/// meaningful for the table that produced them and are not stable across a
/// snapshot/replay cycle that interns values in a different order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub(crate) usize);

impl HandleId {
    /// Returns the position of the value in its table's first-seen order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to the canonical copy of an interned value.
pub struct SharedHandle<S> {
    id: HandleId,
    value: Arc<S>,
}

impl<S> SharedHandle<S> {
    pub(crate) fn new(id: HandleId, value: Arc<S>) -> Self {
        Self { id, value }
    }

    /// Returns the id assigned by the owning table.
    #[inline]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Returns the shared value.
    #[inline]
    pub fn value(&self) -> &S {
        &self.value
    }

    /// Returns `true` if both handles refer to the same physical instance.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.value, &b.value)
    }

    /// Number of live references to the instance, the table's own included.
    pub fn strong_count(handle: &Self) -> usize {
        Arc::strong_count(&handle.value)
    }

    pub(crate) fn shares(&self, value: &Arc<S>) -> bool {
        Arc::ptr_eq(&self.value, value)
    }
}

impl<S> Clone for SharedHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
        }
    }
}

impl<S> Deref for SharedHandle<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.value
    }
}

impl<S> AsRef<S> for SharedHandle<S> {
    fn as_ref(&self) -> &S {
        &self.value
    }
}

// Identity semantics: equal iff same allocation. Hash must agree, so it hashes
// the pointer rather than the value.
impl<S> PartialEq for SharedHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<S> Eq for SharedHandle<S> {}

impl<S> Hash for SharedHandle<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.value), state);
    }
}

impl<S: fmt::Debug> fmt::Debug for SharedHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("id", &self.id)
            .field("value", &*self.value)
            .finish()
    }
}
