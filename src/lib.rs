pub mod classifier;
pub mod error;
pub mod healing;
pub mod hierarchy;
pub mod registry;
pub mod report;
pub mod selector;
pub mod utils;

// Re-export common items
pub use error::{Error, Result};
pub use healing::{HealState, HealingEngine, HealingResult, SnapshotProvider};
pub use hierarchy::{ElementNode, HierarchySnapshot, NodeId, Platform};
pub use registry::{PageModelEntry, PageModelRegistry};
pub use report::generate_report;
pub use selector::{generate_candidates, SelectorCandidate, SelectorStrategy, StabilityClass};
pub use utils::{HealConfig, SimilarityWeights};
