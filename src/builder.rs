//! Builder for context factories.
//!
//! Collects the factory's configuration (capacity hints and an optional
//! unique-state validator) and then picks the interner the factory runs on.
//!
//! ## Example
//!
//! ```rust
//! use internkit::builder::FactoryBuilder;
//! use internkit::error::InvalidArgument;
//!
//! let mut factory = FactoryBuilder::new()
//!     .table_capacity(8)
//!     .registry_capacity(1024)
//!     .validate_unique(|name: &String| {
//!         if name.is_empty() {
//!             Err(InvalidArgument::new("name required"))
//!         } else {
//!             Ok(())
//!         }
//!     })
//!     .build();
//!
//! factory.make_context("margherita".to_string(), (30, "large"));
//! assert_eq!(factory.created_count(), 1);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::context_registry::ContextRegistry;
use crate::ds::intern_table::InternTable;
use crate::ds::scan_table::ScanInternTable;
use crate::error::InvalidArgument;
use crate::factory::{ContextFactory, UniqueValidator};
use crate::traits::Interner;

/// Configuration for a [`ContextFactory`].
pub struct FactoryBuilder<U> {
    table_capacity: usize,
    registry_capacity: usize,
    validator: Option<UniqueValidator<U>>,
}

impl<U> FactoryBuilder<U> {
    pub fn new() -> Self {
        Self {
            table_capacity: 0,
            registry_capacity: 0,
            validator: None,
        }
    }

    /// Expected number of distinct shared values.
    pub fn table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }

    /// Expected number of contexts.
    pub fn registry_capacity(mut self, capacity: usize) -> Self {
        self.registry_capacity = capacity;
        self
    }

    /// Rejects unique state for which `validator` returns an error.
    pub fn validate_unique<F>(mut self, validator: F) -> Self
    where
        F: Fn(&U) -> Result<(), InvalidArgument> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Builds a factory over a hash-keyed [`InternTable`].
    pub fn build<S>(self) -> ContextFactory<U, S>
    where
        S: Eq + Hash,
    {
        let table = InternTable::with_capacity(self.table_capacity);
        self.build_with_table(table)
    }

    /// Builds a factory over a linear-scan [`ScanInternTable`].
    pub fn build_with_scan<S>(self) -> ContextFactory<U, S, ScanInternTable<S>>
    where
        S: Eq,
    {
        let table = ScanInternTable::with_capacity(self.table_capacity);
        self.build_with_table(table)
    }

    /// Builds a factory over a caller-supplied interner.
    ///
    /// The table capacity hint is ignored; size the table yourself.
    pub fn build_with_table<S, T>(self, table: T) -> ContextFactory<U, S, T>
    where
        T: Interner<S>,
    {
        ContextFactory::from_parts(
            table,
            ContextRegistry::with_capacity(self.registry_capacity),
            self.validator,
        )
    }

    /// Builds a thread-safe factory over a shared concurrent interner.
    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<S, T>(
        self,
        table: std::sync::Arc<T>,
    ) -> crate::factory::ConcurrentContextFactory<U, S, T>
    where
        T: crate::traits::ConcurrentInterner<S>,
    {
        crate::factory::ConcurrentContextFactory::from_parts(
            table,
            ContextRegistry::with_capacity(self.registry_capacity),
            self.validator,
        )
    }
}

impl<U> Default for FactoryBuilder<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for FactoryBuilder<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBuilder")
            .field("table_capacity", &self.table_capacity)
            .field("registry_capacity", &self.registry_capacity)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_empty(s: &String) -> Result<(), InvalidArgument> {
        if s.is_empty() {
            Err(InvalidArgument::new("empty"))
        } else {
            Ok(())
        }
    }

    #[test]
    fn build_defaults_to_hash_table() {
        let mut factory = FactoryBuilder::<u32>::new().build();
        factory.make_context(1, "large");
        factory.make_context(2, "large");
        assert_eq!(factory.table().size(), 1);
        assert_eq!(factory.created_count(), 2);
    }

    #[test]
    fn build_with_scan_honors_validator() {
        let mut factory = FactoryBuilder::new()
            .validate_unique(non_empty)
            .build_with_scan::<u8>();
        assert!(factory.try_make_context(String::new(), 1).is_err());
        assert!(factory.try_make_context("a".into(), 1).is_ok());
        assert_eq!(factory.table().size(), 1);
    }

    #[test]
    fn build_with_table_keeps_existing_values() {
        let table: InternTable<&str> = ["large", "medium"].into_iter().collect();
        let mut factory = FactoryBuilder::<u32>::new()
            .registry_capacity(4)
            .build_with_table(table);
        factory.make_context(1, "medium");
        assert_eq!(factory.table().size(), 2);
    }

    #[test]
    fn debug_shows_configuration() {
        let builder = FactoryBuilder::new()
            .table_capacity(3)
            .validate_unique(non_empty);
        let dbg = format!("{:?}", builder);
        assert!(dbg.contains("table_capacity: 3"));
        assert!(dbg.contains("validated: true"));
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn build_concurrent_shares_table() {
        use std::sync::Arc;

        use crate::ds::ConcurrentInternTable;

        let table = Arc::new(ConcurrentInternTable::new());
        let left = FactoryBuilder::<u32>::new().build_concurrent(Arc::clone(&table));
        let right = FactoryBuilder::<u32>::new().build_concurrent(Arc::clone(&table));
        left.make_context(1, "large");
        right.make_context(2, "large");
        right.make_context(3, "small");

        assert_eq!(table.size(), 2);
        assert_eq!(left.created_count(), 1);
        assert_eq!(right.created_count(), 2);
    }
}
