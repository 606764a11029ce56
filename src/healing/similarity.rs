//! Signature similarity scoring
//!
//! Scores how closely a node in a fresh snapshot resembles a stored
//! [`ElementSignature`]. Pure and deterministic over one immutable snapshot;
//! identical inputs always produce identical scores.

use crate::classifier::{ElementAttributes, ElementClassifier};
use crate::hierarchy::{coarse_type, HierarchySnapshot, NodeId};
use crate::selector::ElementSignature;
use crate::utils::config::HealConfig;

/// Weighted similarity of `id` to `signature` in [0, 1].
///
/// Returns `None` when the node cannot be evaluated; callers skip such
/// candidates rather than failing the whole ranking.
pub fn score(
    signature: &ElementSignature,
    snapshot: &HierarchySnapshot,
    id: NodeId,
    classifier: &dyn ElementClassifier,
    config: &HealConfig,
) -> Option<f64> {
    let node = snapshot.node(id)?;
    let weights = &config.weights;

    // Exact label/text match. Either surviving attribute counts in full; the
    // factor is about recognizing the element's wording, not both fields.
    let label_matches =
        signature.label.is_some() && node.label == signature.label;
    let text_matches = signature.text.is_some() && node.text == signature.text;
    let label_text = if label_matches || text_matches { 1.0 } else { 0.0 };

    let ancestor = sequence_similarity(
        &signature.ancestor_chain,
        &snapshot.ancestor_coarse_types(id),
    );

    let sibling = proximity(signature.sibling_index, snapshot.sibling_index(id));

    let type_match = if coarse_type(&node.type_name) == signature.coarse_type {
        1.0
    } else {
        0.0
    };

    let mut total = weights.label_text * label_text
        + weights.ancestor_chain * ancestor
        + weights.sibling_index * sibling
        + weights.coarse_type * type_match;

    // Classifier agreement nudges the score; with no classifier the base
    // weights already sum to 1.0, so nothing is redistributed.
    if let Some(attrs) = ElementAttributes::from_node(snapshot, id) {
        if let Some(prediction) = classifier.classify(&attrs) {
            let adjustment = config.classifier_adjustment * prediction.score.clamp(0.0, 1.0);
            if prediction.semantic_type == signature.coarse_type {
                total += adjustment;
            } else {
                total -= adjustment;
            }
        }
    }

    Some(total.clamp(0.0, 1.0))
}

/// Longest-common-subsequence ratio of two type chains in [0, 1].
/// Two empty chains are identical.
fn sequence_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let longest = a.len().max(b.len());
    lcs_len(a, b) as f64 / longest as f64
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            table[i + 1][j + 1] = if x == y {
                table[i][j] + 1
            } else {
                table[i][j + 1].max(table[i + 1][j])
            };
        }
    }
    table[a.len()][b.len()]
}

/// 1.0 at the same position, decaying with sibling distance
fn proximity(a: usize, b: usize) -> f64 {
    let distance = a.abs_diff(b);
    1.0 / (1.0 + distance as f64)
}
