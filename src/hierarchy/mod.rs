//! Snapshot model and platform adapters
//!
//! The healing algorithms are written once against [`HierarchySnapshot`];
//! the `android` and `ios` adapters populate that contract from their native
//! tree formats.

pub mod android;
pub mod ios;
pub mod node;

pub use node::{
    coarse_type, is_text_bearing, short_type, Bounds, ElementNode, HierarchySnapshot, NodeId,
    Platform,
};
