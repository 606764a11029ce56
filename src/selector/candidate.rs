//! Selector candidate and signature types

use serde::{Deserialize, Serialize};

use crate::hierarchy::{coarse_type, HierarchySnapshot, NodeId};

/// Identification strategy, declared in fixed priority order (best first).
///
/// The derived `Ord` follows declaration order, so sorting candidates by
/// strategy sorts them by priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorStrategy {
    /// Stable identifier attribute (resource-id / accessibility identifier)
    StableId,
    /// Accessibility label / content description
    Label,
    /// Visible text
    Text,
    /// Ancestor path using identifiers where available, type names otherwise
    IdPath,
    /// Pure type-name ancestor path
    TypePath,
    /// Type name + sibling index at every level; always producible
    IndexedPath,
}

impl SelectorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            SelectorStrategy::StableId => "stable-id",
            SelectorStrategy::Label => "label",
            SelectorStrategy::Text => "text",
            SelectorStrategy::IdPath => "id-path",
            SelectorStrategy::TypePath => "type-path",
            SelectorStrategy::IndexedPath => "indexed-path",
        }
    }

    /// Whether the strategy's value is an ancestor path
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            SelectorStrategy::IdPath | SelectorStrategy::TypePath | SelectorStrategy::IndexedPath
        )
    }
}

/// Expected durability of a selector across UI changes.
///
/// Declaration order is best-to-worst; `rank()` gives a sortable number with
/// lower meaning more stable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum StabilityClass {
    High,
    Medium,
    Low,
    Fragile,
}

impl StabilityClass {
    pub fn rank(&self) -> u8 {
        match self {
            StabilityClass::High => 0,
            StabilityClass::Medium => 1,
            StabilityClass::Low => 2,
            StabilityClass::Fragile => 3,
        }
    }

    /// MEDIUM or better, the bar for adopting a healed primary
    pub fn is_medium_or_better(&self) -> bool {
        self.rank() <= StabilityClass::Medium.rank()
    }
}

/// One proposed way to identify an element, with its computed uniqueness
/// and stability in the originating snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorCandidate {
    pub strategy: SelectorStrategy,
    pub value: String,
    /// Exact-match count in the originating snapshot
    pub uniqueness: usize,
    pub stability: StabilityClass,
}

impl SelectorCandidate {
    pub fn is_unique(&self) -> bool {
        self.uniqueness == 1
    }

    /// Ancestor levels touched by this candidate's value (0 for non-paths)
    pub fn depth(&self) -> usize {
        if self.strategy.is_path() {
            self.value.split('/').count()
        } else {
            0
        }
    }

    /// Get a short representation for logs and audit output.
    /// Long values are truncated for display only, never for matching.
    pub fn short_repr(&self) -> String {
        let mut value = self.value.clone();
        if value.chars().count() > 60 {
            value = value.chars().take(57).collect::<String>() + "...";
        }
        format!("{}=\"{}\"", self.strategy.name(), value)
    }
}

/// Stable attribute subset captured at generation time, used to re-identify
/// the same logical element after its selector stops matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSignature {
    /// Coarse semantic type (see [`coarse_type`])
    pub coarse_type: String,
    pub label: Option<String>,
    pub text: Option<String>,
    /// Ancestor coarse types, root first
    pub ancestor_chain: Vec<String>,
    /// Position among siblings
    pub sibling_index: usize,
}

impl ElementSignature {
    /// Capture the signature of `id` in `snapshot`
    pub fn capture(snapshot: &HierarchySnapshot, id: NodeId) -> Option<Self> {
        let node = snapshot.node(id)?;
        Some(Self {
            coarse_type: coarse_type(&node.type_name),
            label: node.label.clone(),
            text: node.text.clone(),
            ancestor_chain: snapshot.ancestor_coarse_types(id),
            sibling_index: snapshot.sibling_index(id),
        })
    }
}
