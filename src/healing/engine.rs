//! Healing engine
//!
//! Drives a failed selector lookup through the healing state machine:
//! fallback survival against the fresh snapshot first, then a broadened
//! signature-similarity search over same-type nodes, ending in one of
//! ACCEPTED, DEFERRED or UNRESOLVED. Every decision lands in the entry's
//! audit trail; selectors mutate only on ACCEPTED.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::classifier::{ElementClassifier, NoopClassifier};
use crate::error::{Error, Result};
use crate::hierarchy::{coarse_type, HierarchySnapshot, NodeId};
use crate::registry::PageModelRegistry;
use crate::selector::{
    find_matches, generate_candidates_with, ElementSignature, SelectorCandidate,
};
use crate::utils::config::HealConfig;

use super::similarity;

/// Terminal state of one healing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealState {
    /// A replacement selector was adopted as primary
    Accepted,
    /// A suggestion was recorded but not applied (gray-zone confidence)
    Deferred,
    /// No acceptable replacement exists; the caller must surface this
    Unresolved,
}

/// Outcome of one healing attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingResult {
    pub state: HealState,
    pub confidence: f64,
    pub selector: Option<SelectorCandidate>,
}

/// Captures a fresh snapshot from the running application.
///
/// The one blocking edge to the outside world; the engine bounds every call
/// with the configured timeout.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn capture(&self) -> anyhow::Result<HierarchySnapshot>;
}

/// Self-healing engine owning its registry, provider and configuration.
///
/// Constructed and torn down explicitly by the caller; there is no global
/// state.
pub struct HealingEngine {
    registry: Arc<PageModelRegistry>,
    provider: Arc<dyn SnapshotProvider>,
    classifier: Arc<dyn ElementClassifier>,
    config: HealConfig,
    checkpoint_path: Option<PathBuf>,
}

impl HealingEngine {
    pub fn new(registry: Arc<PageModelRegistry>, provider: Arc<dyn SnapshotProvider>) -> Self {
        Self {
            registry,
            provider,
            classifier: Arc::new(NoopClassifier),
            config: HealConfig::default(),
            checkpoint_path: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ElementClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_config(mut self, config: HealConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist the page model to `path` after each completed decision
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = Some(path.into());
        self
    }

    pub fn registry(&self) -> &Arc<PageModelRegistry> {
        &self.registry
    }

    /// Heal `name` against a freshly captured snapshot.
    ///
    /// Bounded by the snapshot timeout and the overall attempt deadline;
    /// exceeding either returns `Error::SnapshotTimeout` with no registry
    /// mutation, never a hung attempt.
    pub async fn heal(&self, name: &str) -> Result<HealingResult> {
        if !self.registry.contains(name) {
            return Err(Error::UnknownEntry(name.to_string()));
        }

        let deadline = Duration::from_millis(self.config.attempt_deadline_ms);
        timeout(deadline, self.capture_and_heal(name))
            .await
            .map_err(|_| Error::SnapshotTimeout {
                timeout_ms: self.config.attempt_deadline_ms,
            })?
    }

    async fn capture_and_heal(&self, name: &str) -> Result<HealingResult> {
        let capture_bound = Duration::from_millis(self.config.snapshot_timeout_ms);
        let snapshot = timeout(capture_bound, self.provider.capture())
            .await
            .map_err(|_| Error::SnapshotTimeout {
                timeout_ms: self.config.snapshot_timeout_ms,
            })?
            .map_err(Error::SnapshotCapture)?;

        self.heal_with_snapshot(name, &snapshot)
    }

    /// Deterministic core of the state machine: identical (entry, snapshot)
    /// inputs always yield the same decision and confidence.
    pub fn heal_with_snapshot(
        &self,
        name: &str,
        snapshot: &HierarchySnapshot,
    ) -> Result<HealingResult> {
        let entry = self
            .registry
            .get(name)
            .map_err(|_| Error::UnknownEntry(name.to_string()))?;

        info!(
            "healing '{}' against snapshot of '{}' ({} nodes)",
            name,
            snapshot.screen,
            snapshot.len()
        );

        // 1. A stored fallback that still matches exactly once and
        //    corroborates the signature is a known-good selector.
        for fallback in &entry.fallbacks {
            let matches = find_matches(snapshot, fallback.strategy, &fallback.value);
            if matches.len() == 1 && corroborates(&entry.signature, snapshot, matches[0]) {
                info!(
                    "'{}': fallback {} survived, accepting",
                    name,
                    fallback.short_repr()
                );
                self.registry
                    .record_healing(name, Some(fallback.clone()), 1.0, true)?;
                self.checkpoint_if_configured();
                return Ok(HealingResult {
                    state: HealState::Accepted,
                    confidence: 1.0,
                    selector: Some(fallback.clone()),
                });
            }
        }

        // 2. Broaden: rank every node of the signature's coarse type by
        //    similarity. Per-node scoring failures are skipped, not fatal.
        let mut scored: Vec<(f64, NodeId)> = snapshot
            .ids()
            .filter(|&id| {
                snapshot
                    .node(id)
                    .map_or(false, |n| coarse_type(&n.type_name) == entry.signature.coarse_type)
            })
            .filter_map(|id| {
                similarity::score(
                    &entry.signature,
                    snapshot,
                    id,
                    self.classifier.as_ref(),
                    &self.config,
                )
                .map(|s| (s, id))
            })
            .collect();

        // Stable ranking: score descending, tree order for equal scores.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let (top_score, top_id) = match scored.first() {
            Some(&best) => best,
            None => {
                warn!(
                    "'{}': no node of type '{}' in fresh snapshot",
                    name, entry.signature.coarse_type
                );
                return self.resolve_unresolved(name);
            }
        };
        debug!(
            "'{}': best similarity {:.2} across {} candidate nodes",
            name,
            top_score,
            scored.len()
        );

        if top_score < self.config.defer_threshold {
            return self.resolve_unresolved(name);
        }

        let candidates = generate_candidates_with(snapshot, top_id, &self.config);
        let replacement = candidates
            .iter()
            .find(|c| c.is_unique() && c.stability.is_medium_or_better())
            .cloned();

        // Adoption needs both high similarity and a selector worth keeping.
        if top_score >= self.config.accept_threshold {
            if let Some(new_primary) = replacement {
                info!(
                    "'{}': accepting {} at confidence {:.2}",
                    name,
                    new_primary.short_repr(),
                    top_score
                );
                self.registry
                    .record_healing(name, Some(new_primary.clone()), top_score, true)?;
                self.checkpoint_if_configured();
                return Ok(HealingResult {
                    state: HealState::Accepted,
                    confidence: top_score,
                    selector: Some(new_primary),
                });
            }
            warn!(
                "'{}': similarity {:.2} but no unique MEDIUM-or-better selector, deferring",
                name, top_score
            );
        }

        // Gray zone: record the suggestion without touching the primary.
        let suggestion = replacement
            .or_else(|| candidates.iter().find(|c| c.is_unique()).cloned())
            .or_else(|| candidates.first().cloned());
        info!(
            "'{}': deferring suggestion {:?} at confidence {:.2}",
            name,
            suggestion.as_ref().map(|c| c.short_repr()),
            top_score
        );
        self.registry
            .record_healing(name, suggestion.clone(), top_score, false)?;
        self.checkpoint_if_configured();
        Ok(HealingResult {
            state: HealState::Deferred,
            confidence: top_score,
            selector: suggestion,
        })
    }

    fn resolve_unresolved(&self, name: &str) -> Result<HealingResult> {
        self.registry.record_healing(name, None, 0.0, false)?;
        self.checkpoint_if_configured();
        Ok(HealingResult {
            state: HealState::Unresolved,
            confidence: 0.0,
            selector: None,
        })
    }

    fn checkpoint_if_configured(&self) {
        if let Some(path) = &self.checkpoint_path {
            if let Err(e) = self.registry.checkpoint(path) {
                warn!("checkpoint to {} failed: {}", path.display(), e);
            }
        }
    }
}

/// A candidate node corroborates the stored signature when its coarse type
/// matches and at least one of label, text or the full ancestor type chain
/// agrees.
fn corroborates(signature: &ElementSignature, snapshot: &HierarchySnapshot, id: NodeId) -> bool {
    let node = match snapshot.node(id) {
        Some(n) => n,
        None => return false,
    };

    if coarse_type(&node.type_name) != signature.coarse_type {
        return false;
    }

    let label_agrees = signature.label.is_some() && node.label == signature.label;
    let text_agrees = signature.text.is_some() && node.text == signature.text;
    let chain_agrees = snapshot.ancestor_coarse_types(id) == signature.ancestor_chain;

    label_agrees || text_agrees || chain_agrees
}
