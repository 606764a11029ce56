use thiserror::Error;

/// Errors produced by the selector engine and registry.
///
/// `SnapshotTimeout` is attempt-scoped: the current healing attempt is
/// resolved and may be retried. `UnknownEntry` is a caller error and fatal
/// for the request. `NoUniqueCandidate` still persists the (flagged) entry.
#[derive(Debug, Error)]
pub enum Error {
    /// Snapshot capture (or the whole healing attempt) exceeded its deadline
    #[error("snapshot capture exceeded {timeout_ms}ms")]
    SnapshotTimeout { timeout_ms: u64 },

    /// Healing was requested for a name that was never registered
    #[error("healing requested for unregistered element '{0}'")]
    UnknownEntry(String),

    /// No entry with this name in the page model
    #[error("no entry named '{0}' in the page model")]
    NotFound(String),

    /// Generation produced no uniqueness==1 candidate; the entry was
    /// persisted with its fragile candidates and flagged
    #[error("no unique candidate for '{0}', entry persisted flagged")]
    NoUniqueCandidate(String),

    /// The snapshot provider failed outright
    #[error("snapshot capture failed: {0}")]
    SnapshotCapture(anyhow::Error),

    /// Registry checkpoint write or load failed
    #[error("page model persistence failed: {0}")]
    Persistence(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
