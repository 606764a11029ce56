pub mod types;

use std::path::Path;

use crate::error::{Error, Result};
use crate::registry::PageModelRegistry;

pub use types::{AuditReport, EntryReport, ReportSummary};

/// Render the registry's audit state as pretty-printed JSON
pub fn render_report(registry: &PageModelRegistry) -> Result<String> {
    let report = AuditReport::from_registry(registry);
    serde_json::to_string_pretty(&report).map_err(|e| Error::Persistence(e.into()))
}

/// Write the audit report for `registry` to `output`
pub fn generate_report(registry: &PageModelRegistry, output: &Path) -> Result<()> {
    let json = render_report(registry)?;
    std::fs::write(output, json).map_err(|e| Error::Persistence(e.into()))?;
    Ok(())
}
