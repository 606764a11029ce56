//! Selector candidate generation, uniqueness validation and stability scoring

pub mod candidate;
pub mod generator;
pub mod stability;
pub mod uniqueness;

pub use candidate::{ElementSignature, SelectorCandidate, SelectorStrategy, StabilityClass};
pub use generator::{generate_candidates, generate_candidates_with};
pub use stability::{candidate_order, classify, looks_dynamic};
pub use uniqueness::{count_matches, find_matches};
