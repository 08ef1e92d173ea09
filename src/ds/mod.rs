pub mod context_registry;
pub mod handle;
pub mod intern_table;
pub mod scan_table;

pub use context_registry::{ContextId, ContextRegistry};
pub use handle::{HandleId, SharedHandle};
#[cfg(feature = "concurrency")]
pub use intern_table::ConcurrentInternTable;
pub use intern_table::InternTable;
pub use scan_table::ScanInternTable;
