pub mod engine;
pub mod similarity;

pub use engine::{HealState, HealingEngine, HealingResult, SnapshotProvider};
