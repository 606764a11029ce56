//! Page model registry
//!
//! Process-scoped store of [`PageModelEntry`] records. The outer map lock is
//! held only to resolve a name; every mutation runs under that entry's own
//! lock, so at most one mutation per logical element is in flight and reads
//! always observe a fully-written entry.

use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::selector::{ElementSignature, SelectorCandidate};

use super::entry::{HealingRecord, PageModelEntry};

pub struct PageModelRegistry {
    entries: Mutex<HashMap<String, Arc<Mutex<PageModelEntry>>>>,
    history_cap: usize,
}

impl Default for PageModelRegistry {
    fn default() -> Self {
        Self::new(25)
    }
}

impl PageModelRegistry {
    pub fn new(history_cap: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            history_cap,
        }
    }

    /// Register (or re-register at build time) a logical element from its
    /// generated candidates.
    ///
    /// Candidates with uniqueness != 1 are discarded from the chain. When no
    /// unique candidate exists the entry is still persisted, flagged, and
    /// `Error::NoUniqueCandidate` is returned so the caller cannot miss it.
    /// Healing history survives re-registration.
    pub fn upsert(
        &self,
        name: &str,
        candidates: Vec<SelectorCandidate>,
        signature: ElementSignature,
    ) -> Result<PageModelEntry> {
        let mut entry = PageModelEntry::from_candidates(name, candidates, signature);

        let mut entries = self.entries.lock().unwrap();
        if let Some(existing) = entries.get(name) {
            let existing = existing.lock().unwrap();
            entry.history = existing.history.clone();
        }

        debug!(
            "upsert '{}': primary={:?}, {} fallbacks, flagged={}",
            name,
            entry.primary.as_ref().map(|c| c.short_repr()),
            entry.fallbacks.len(),
            entry.flagged
        );

        entries.insert(name.to_string(), Arc::new(Mutex::new(entry.clone())));

        if entry.flagged {
            warn!("'{}' has no unique candidate, persisted flagged", name);
            return Err(Error::NoUniqueCandidate(name.to_string()));
        }
        Ok(entry)
    }

    /// Fetch a full copy of an entry
    pub fn get(&self, name: &str) -> Result<PageModelEntry> {
        let handle = self.entry_handle(name)?;
        let entry = handle.lock().unwrap();
        Ok(entry.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().unwrap().contains_key(name)
    }

    /// Append a healing decision to an entry's audit trail. An accepted
    /// decision promotes `new_selector` to primary and keeps the prior
    /// primary at the front of the fallback chain.
    pub fn record_healing(
        &self,
        name: &str,
        new_selector: Option<SelectorCandidate>,
        confidence: f64,
        accepted: bool,
    ) -> Result<PageModelEntry> {
        let handle = self.entry_handle(name)?;
        let mut entry = handle.lock().unwrap();

        let record = HealingRecord {
            timestamp: Utc::now(),
            entry: name.to_string(),
            old_selector: entry.primary.clone(),
            new_selector,
            confidence,
            accepted,
        };
        debug!(
            "healing record for '{}': accepted={}, confidence={:.2}, new={:?}",
            name,
            accepted,
            confidence,
            record.new_selector.as_ref().map(|c| c.short_repr())
        );
        entry.apply_record(record, self.history_cap);
        Ok(entry.clone())
    }

    /// Copies of all entries, name-ordered
    pub fn entries(&self) -> Vec<PageModelEntry> {
        let entries = self.entries.lock().unwrap();
        let mut all: Vec<PageModelEntry> = entries
            .values()
            .map(|e| e.lock().unwrap().clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Every healing record across all entries, oldest first
    pub fn audit_records(&self) -> Vec<HealingRecord> {
        let mut records: Vec<HealingRecord> = self
            .entries()
            .into_iter()
            .flat_map(|e| e.history)
            .collect();
        records.sort_by_key(|r| r.timestamp);
        records
    }

    /// Write the whole model to `path` as JSON. Called after each completed
    /// healing decision; a crash loses at most one decision, which healing
    /// idempotency makes safe to redo.
    pub fn checkpoint(&self, path: &Path) -> Result<()> {
        let all = self.entries();
        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| Error::Persistence(e.into()))?;
        std::fs::write(path, json).map_err(|e| Error::Persistence(e.into()))?;
        debug!("checkpointed {} entries to {}", all.len(), path.display());
        Ok(())
    }

    /// Load a previously checkpointed model
    pub fn load(path: &Path, history_cap: usize) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::Persistence(e.into()))?;
        let all: Vec<PageModelEntry> =
            serde_json::from_str(&json).map_err(|e| Error::Persistence(e.into()))?;

        let registry = Self::new(history_cap);
        {
            let mut entries = registry.entries.lock().unwrap();
            for entry in all {
                entries.insert(entry.name.clone(), Arc::new(Mutex::new(entry)));
            }
        }
        Ok(registry)
    }

    fn entry_handle(&self, name: &str) -> Result<Arc<Mutex<PageModelEntry>>> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{SelectorStrategy, StabilityClass};

    fn candidate(strategy: SelectorStrategy, value: &str, uniqueness: usize) -> SelectorCandidate {
        let depth = value.split('/').count();
        SelectorCandidate {
            strategy,
            value: value.to_string(),
            uniqueness,
            stability: crate::selector::classify(strategy, uniqueness, depth),
        }
    }

    fn signature() -> ElementSignature {
        ElementSignature {
            coarse_type: "Button".to_string(),
            label: None,
            text: Some("Log In".to_string()),
            ancestor_chain: vec!["FrameLayout".to_string()],
            sibling_index: 0,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let registry = PageModelRegistry::default();
        registry
            .upsert(
                "login_button",
                vec![candidate(SelectorStrategy::StableId, "login_btn", 1)],
                signature(),
            )
            .unwrap();

        let entry = registry.get("login_button").unwrap();
        assert_eq!(entry.primary.unwrap().value, "login_btn");
        assert!(matches!(
            registry.get("missing"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_upsert_without_unique_candidate_persists_flagged() {
        let registry = PageModelRegistry::default();
        let result = registry.upsert(
            "row",
            vec![candidate(SelectorStrategy::StableId, "list_item", 4)],
            signature(),
        );

        assert!(matches!(result, Err(Error::NoUniqueCandidate(_))));
        let entry = registry.get("row").unwrap();
        assert!(entry.flagged);
        assert!(entry.primary.is_none());
        assert_eq!(entry.diagnostics.len(), 1);
    }

    #[test]
    fn test_upsert_preserves_history() {
        let registry = PageModelRegistry::default();
        registry
            .upsert(
                "login_button",
                vec![candidate(SelectorStrategy::StableId, "login_btn", 1)],
                signature(),
            )
            .unwrap();
        registry
            .record_healing("login_button", None, 0.0, false)
            .unwrap();

        registry
            .upsert(
                "login_button",
                vec![candidate(SelectorStrategy::StableId, "login_btn_v2", 1)],
                signature(),
            )
            .unwrap();

        let entry = registry.get("login_button").unwrap();
        assert_eq!(entry.primary.unwrap().value, "login_btn_v2");
        assert_eq!(entry.history.len(), 1);
    }

    #[test]
    fn test_record_healing_accepted_promotes() {
        let registry = PageModelRegistry::default();
        registry
            .upsert(
                "login_button",
                vec![
                    candidate(SelectorStrategy::StableId, "login_btn", 1),
                    candidate(SelectorStrategy::Text, "Log In", 1),
                ],
                signature(),
            )
            .unwrap();

        let new = candidate(SelectorStrategy::StableId, "sign_in_btn", 1);
        let entry = registry
            .record_healing("login_button", Some(new), 0.82, true)
            .unwrap();

        assert_eq!(entry.primary.unwrap().value, "sign_in_btn");
        assert_eq!(entry.fallbacks[0].value, "login_btn");
        let record = &entry.history[0];
        assert!(record.accepted);
        assert_eq!(record.old_selector.as_ref().unwrap().value, "login_btn");
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let registry = PageModelRegistry::default();
        registry
            .upsert(
                "login_button",
                vec![candidate(SelectorStrategy::StableId, "login_btn", 1)],
                signature(),
            )
            .unwrap();
        registry
            .record_healing("login_button", None, 0.0, false)
            .unwrap();

        let path = std::env::temp_dir().join("selector-healer-checkpoint-test.json");
        registry.checkpoint(&path).unwrap();

        let restored = PageModelRegistry::load(&path, 25).unwrap();
        let entry = restored.get("login_button").unwrap();
        assert_eq!(entry.primary.unwrap().value, "login_btn");
        assert_eq!(entry.history.len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_concurrent_mutation_per_entry() {
        let registry = Arc::new(PageModelRegistry::default());
        registry
            .upsert(
                "login_button",
                vec![candidate(SelectorStrategy::StableId, "login_btn", 1)],
                signature(),
            )
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry
                    .record_healing("login_button", None, 0.1, false)
                    .unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.get("login_button").unwrap().history.len(), 8);
    }
}
