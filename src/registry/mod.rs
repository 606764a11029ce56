//! Persisted page model: entries, audit trail, and the process-scoped store

pub mod entry;
pub mod store;

pub use entry::{HealingRecord, PageModelEntry};
pub use store::PageModelRegistry;
