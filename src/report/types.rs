use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::{HealingRecord, PageModelRegistry};
use crate::selector::SelectorCandidate;

/// Audit report over a page model registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub entries: Vec<EntryReport>,
    pub records: Vec<HealingRecord>,
    pub summary: ReportSummary,
    pub generated_at: DateTime<Utc>,
}

/// Per-entry view of the current selector state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryReport {
    pub name: String,
    pub primary: Option<SelectorCandidate>,
    pub fallback_count: usize,
    pub flagged: bool,
    pub healing_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_entries: usize,
    pub flagged_entries: usize,
    pub accepted_healings: usize,
    pub rejected_healings: usize,
}

impl AuditReport {
    /// Snapshot the registry into a serializable report
    pub fn from_registry(registry: &PageModelRegistry) -> Self {
        let entries: Vec<EntryReport> = registry
            .entries()
            .iter()
            .map(|e| EntryReport {
                name: e.name.clone(),
                primary: e.primary.clone(),
                fallback_count: e.fallbacks.len(),
                flagged: e.flagged,
                healing_attempts: e.history.len(),
            })
            .collect();

        let records = registry.audit_records();
        let summary = ReportSummary {
            total_entries: entries.len(),
            flagged_entries: entries.iter().filter(|e| e.flagged).count(),
            accepted_healings: records.iter().filter(|r| r.accepted).count(),
            rejected_healings: records.iter().filter(|r| !r.accepted).count(),
        };

        Self {
            entries,
            records,
            summary,
            generated_at: Utc::now(),
        }
    }
}
