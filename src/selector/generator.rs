//! Candidate generation
//!
//! Produces the full ordered list of identification strategies for one node,
//! in fixed priority order. Every strategy that applies is emitted, not just
//! the winner; ambiguous values are demoted by the uniqueness check rather
//! than discarded.

use crate::hierarchy::{coarse_type, is_text_bearing, short_type, HierarchySnapshot, NodeId};
use crate::utils::config::HealConfig;

use super::candidate::{SelectorCandidate, SelectorStrategy};
use super::stability::classify;
use super::uniqueness::count_matches;

/// Generate all viable candidates for `id`, best strategy first
pub fn generate_candidates(snapshot: &HierarchySnapshot, id: NodeId) -> Vec<SelectorCandidate> {
    generate_candidates_with(snapshot, id, &HealConfig::default())
}

/// Generate candidates with explicit length thresholds
pub fn generate_candidates_with(
    snapshot: &HierarchySnapshot,
    id: NodeId,
    config: &HealConfig,
) -> Vec<SelectorCandidate> {
    let node = match snapshot.node(id) {
        Some(n) => n,
        None => return Vec::new(),
    };

    let mut values = Vec::new();

    // 1. Stable identifier
    if let Some(stable_id) = node.stable_id.as_deref() {
        if !stable_id.is_empty() {
            values.push((SelectorStrategy::StableId, stable_id.to_string()));
        }
    }

    // 2. Accessibility label, length-capped
    if let Some(label) = node.label.as_deref() {
        if !label.trim().is_empty() && label.chars().count() <= config.max_label_len {
            values.push((SelectorStrategy::Label, label.to_string()));
        }
    }

    // 3. Visible text, only for text-bearing types
    if let Some(text) = node.text.as_deref() {
        if !text.trim().is_empty()
            && text.chars().count() < config.max_text_len
            && is_text_bearing(&coarse_type(&node.type_name))
        {
            values.push((SelectorStrategy::Text, text.to_string()));
        }
    }

    // 4.-6. Ancestor paths; the indexed path is always producible
    values.push((SelectorStrategy::IdPath, id_path(snapshot, id)));
    values.push((SelectorStrategy::TypePath, type_path(snapshot, id)));
    values.push((SelectorStrategy::IndexedPath, indexed_path(snapshot, id)));

    values
        .into_iter()
        .map(|(strategy, value)| {
            let uniqueness = count_matches(snapshot, strategy, &value);
            let depth = if strategy.is_path() {
                value.split('/').count()
            } else {
                0
            };
            SelectorCandidate {
                strategy,
                value,
                uniqueness,
                stability: classify(strategy, uniqueness, depth),
            }
        })
        .collect()
}

/// Path from root to `id` using `#identifier` segments where present,
/// short type names otherwise
pub(crate) fn id_path(snapshot: &HierarchySnapshot, id: NodeId) -> String {
    path_of(snapshot, id, |snapshot, node_id| {
        let node = snapshot.node(node_id)?;
        Some(match node.stable_id.as_deref() {
            Some(sid) if !sid.is_empty() => format!("#{}", sid),
            _ => short_type(&node.type_name).to_string(),
        })
    })
}

/// Path from root to `id` of short type names only
pub(crate) fn type_path(snapshot: &HierarchySnapshot, id: NodeId) -> String {
    path_of(snapshot, id, |snapshot, node_id| {
        let node = snapshot.node(node_id)?;
        Some(short_type(&node.type_name).to_string())
    })
}

/// Path from root to `id` with type name + sibling index at every level
pub(crate) fn indexed_path(snapshot: &HierarchySnapshot, id: NodeId) -> String {
    path_of(snapshot, id, |snapshot, node_id| {
        let node = snapshot.node(node_id)?;
        Some(format!(
            "{}[{}]",
            short_type(&node.type_name),
            snapshot.sibling_index(node_id)
        ))
    })
}

fn path_of(
    snapshot: &HierarchySnapshot,
    id: NodeId,
    segment: impl Fn(&HierarchySnapshot, NodeId) -> Option<String>,
) -> String {
    let mut ids = snapshot.ancestors(id);
    ids.push(id);
    ids.into_iter()
        .filter_map(|node_id| segment(snapshot, node_id))
        .collect::<Vec<_>>()
        .join("/")
}
