pub mod config;

pub use config::{HealConfig, SimilarityWeights};
