//! Error types for the internkit library.
//!
//! ## Key Components
//!
//! - [`InvalidArgument`]: Returned when a factory's unique-state validator
//!   rejects the data handed to
//!   [`try_make_context`](crate::factory::ContextFactory::try_make_context).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods on the intern tables).
//!
//! Interning itself never fails, so there is no error type for it.
//!
//! ## Example Usage
//!
//! ```
//! use internkit::builder::FactoryBuilder;
//! use internkit::error::InvalidArgument;
//!
//! let mut factory = FactoryBuilder::<String>::new()
//!     .validate_unique(|name: &String| {
//!         if name.is_empty() {
//!             Err(InvalidArgument::new("unique state must not be empty"))
//!         } else {
//!             Ok(())
//!         }
//!     })
//!     .build::<u32>();
//!
//! assert!(factory.try_make_context("order-1".to_string(), 30).is_ok());
//!
//! // Rejected without panicking, and nothing is interned
//! let err = factory.try_make_context(String::new(), 25).unwrap_err();
//! assert!(err.to_string().contains("empty"));
//! assert_eq!(factory.table().size(), 1);
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal table invariants are violated.
///
/// Produced by [`InternTable::check_invariants`](crate::ds::InternTable::check_invariants)
/// and [`ScanInternTable::check_invariants`](crate::ds::ScanInternTable::check_invariants).
/// A failure here almost always means the `Eq`/`Hash` contract of the shared
/// state type is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// InvalidArgument
// ---------------------------------------------------------------------------

/// Error returned when unique state handed to a context factory is rejected.
///
/// Validators are installed with
/// [`FactoryBuilder::validate_unique`](crate::builder::FactoryBuilder::validate_unique).
/// The panicking [`make_context`](crate::factory::ContextFactory::make_context)
/// reports the same message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArgument(String);

impl InvalidArgument {
    /// Creates a new `InvalidArgument` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidArgument {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
