pub use crate::builder::FactoryBuilder;
pub use crate::ds::{
    ContextId, ContextRegistry, HandleId, InternTable, ScanInternTable, SharedHandle,
};

#[cfg(feature = "concurrency")]
pub use crate::ds::ConcurrentInternTable;
pub use crate::error::{InvalidArgument, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::factory::ConcurrentContextFactory;
pub use crate::factory::{Context, ContextFactory, UniqueValidator};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{FactoryMetricsSnapshot, InternMetricsSnapshot};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsExporter, MetricsReset, MetricsSnapshotProvider};
#[cfg(feature = "concurrency")]
pub use crate::traits::ConcurrentInterner;
pub use crate::traits::Interner;
