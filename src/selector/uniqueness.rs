//! Uniqueness validation
//!
//! Counts exact-match occurrences of a candidate value in one snapshot.
//! No substring matching: a count of 1 makes the candidate primary-eligible,
//! 0 means the selector is stale, >1 means ambiguous.

use crate::hierarchy::{HierarchySnapshot, NodeId};

use super::candidate::SelectorStrategy;
use super::generator::{id_path, indexed_path, type_path};

/// Number of nodes in `snapshot` that the (strategy, value) pair matches exactly
pub fn count_matches(snapshot: &HierarchySnapshot, strategy: SelectorStrategy, value: &str) -> usize {
    find_matches(snapshot, strategy, value).len()
}

/// Ids of all nodes the (strategy, value) pair matches exactly, in tree order
pub fn find_matches(
    snapshot: &HierarchySnapshot,
    strategy: SelectorStrategy,
    value: &str,
) -> Vec<NodeId> {
    snapshot
        .ids()
        .filter(|&id| matches_node(snapshot, id, strategy, value))
        .collect()
}

fn matches_node(
    snapshot: &HierarchySnapshot,
    id: NodeId,
    strategy: SelectorStrategy,
    value: &str,
) -> bool {
    let node = match snapshot.node(id) {
        Some(n) => n,
        None => return false,
    };

    match strategy {
        SelectorStrategy::StableId => node.stable_id.as_deref() == Some(value),
        SelectorStrategy::Label => node.label.as_deref() == Some(value),
        SelectorStrategy::Text => node.text.as_deref() == Some(value),
        SelectorStrategy::IdPath => id_path(snapshot, id) == value,
        SelectorStrategy::TypePath => type_path(snapshot, id) == value,
        SelectorStrategy::IndexedPath => indexed_path(snapshot, id) == value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{ElementNode, Platform};

    fn snapshot_with_texts(texts: &[&str]) -> HierarchySnapshot {
        let mut snap = HierarchySnapshot::new(Platform::Android, "screen");
        let root = snap.push_node(None, ElementNode::new("android.widget.FrameLayout"));
        for t in texts {
            let mut n = ElementNode::new("android.widget.TextView");
            n.text = Some(t.to_string());
            snap.push_node(Some(root), n);
        }
        snap
    }

    #[test]
    fn test_exact_match_counting() {
        let snap = snapshot_with_texts(&["Apple", "Banana", "Apple"]);
        assert_eq!(count_matches(&snap, SelectorStrategy::Text, "Apple"), 2);
        assert_eq!(count_matches(&snap, SelectorStrategy::Text, "Banana"), 1);
        assert_eq!(count_matches(&snap, SelectorStrategy::Text, "Cherry"), 0);
    }

    #[test]
    fn test_no_substring_matching() {
        let snap = snapshot_with_texts(&["Apple Pie"]);
        assert_eq!(count_matches(&snap, SelectorStrategy::Text, "Apple"), 0);
    }

    #[test]
    fn test_find_matches_in_tree_order() {
        let snap = snapshot_with_texts(&["Apple", "Banana", "Apple"]);
        assert_eq!(find_matches(&snap, SelectorStrategy::Text, "Apple"), vec![1, 3]);
    }

    #[test]
    fn test_path_matching() {
        let snap = snapshot_with_texts(&["Apple"]);
        assert_eq!(
            count_matches(&snap, SelectorStrategy::TypePath, "FrameLayout/TextView"),
            1
        );
        assert_eq!(
            count_matches(&snap, SelectorStrategy::IndexedPath, "FrameLayout[0]/TextView[0]"),
            1
        );
        assert_eq!(
            count_matches(&snap, SelectorStrategy::TypePath, "FrameLayout/Button"),
            0
        );
    }
}
