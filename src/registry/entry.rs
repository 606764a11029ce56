//! Page model entries and their healing audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::selector::{candidate_order, ElementSignature, SelectorCandidate};

/// One append-only audit record of a healing decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingRecord {
    pub timestamp: DateTime<Utc>,
    pub entry: String,
    pub old_selector: Option<SelectorCandidate>,
    /// `None` when healing resolved without a replacement (UNRESOLVED)
    pub new_selector: Option<SelectorCandidate>,
    pub confidence: f64,
    pub accepted: bool,
}

/// Persisted identification state of one logical element.
///
/// Created at model-build time, mutated only through healing records
/// afterwards; never silently regenerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModelEntry {
    pub name: String,
    /// Unique at the moment it was chosen; `None` only on flagged entries
    pub primary: Option<SelectorCandidate>,
    /// Unique candidates only, in strategy-priority order
    pub fallbacks: Vec<SelectorCandidate>,
    pub signature: ElementSignature,
    /// Non-unique candidates kept for diagnostics on flagged entries
    pub diagnostics: Vec<SelectorCandidate>,
    /// Append-only, FIFO-capped healing history
    pub history: Vec<HealingRecord>,
    /// Set when generation produced no uniqueness==1 candidate
    pub flagged: bool,
}

impl PageModelEntry {
    /// Build an entry from a freshly generated candidate list.
    ///
    /// Candidates with uniqueness != 1 are never eligible for primary or the
    /// fallback chain; they are retained only as diagnostics when nothing
    /// unique exists.
    pub fn from_candidates(
        name: impl Into<String>,
        candidates: Vec<SelectorCandidate>,
        signature: ElementSignature,
    ) -> Self {
        let (mut unique, ambiguous): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.is_unique());
        unique.sort_by(candidate_order);

        let flagged = unique.is_empty();
        let mut unique = unique.into_iter();
        let primary = unique.next();

        Self {
            name: name.into(),
            primary,
            fallbacks: unique.collect(),
            signature,
            diagnostics: if flagged { ambiguous } else { Vec::new() },
            history: Vec::new(),
            flagged,
        }
    }

    /// Primary followed by the fallback chain, best first
    pub fn selector_chain(&self) -> impl Iterator<Item = &SelectorCandidate> {
        self.primary.iter().chain(self.fallbacks.iter())
    }

    /// Append a healing record; an accepted record promotes its new selector
    /// to primary and pushes the prior primary to the front of the fallback
    /// chain. History beyond `cap` evicts the oldest records only.
    pub fn apply_record(&mut self, record: HealingRecord, cap: usize) {
        if record.accepted {
            if let Some(new_primary) = record.new_selector.clone() {
                // the surviving fallback must not appear twice in the chain
                self.fallbacks.retain(|c| *c != new_primary);
                if let Some(old) = self.primary.take() {
                    self.fallbacks.insert(0, old);
                }
                self.primary = Some(new_primary);
                self.flagged = false;
            }
        }

        self.history.push(record);
        while self.history.len() > cap {
            self.history.remove(0);
        }
    }
}
