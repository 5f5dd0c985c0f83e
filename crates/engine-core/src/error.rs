use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize repository snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Lock error: {0}")]
    Lock(String),
}

/// Commit-level failure for a whole import call. Per-draft problems are
/// accounted inside `ImportResult` instead; this error fires only when the
/// commit as a whole cannot proceed or produced nothing.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No target period selected and auto-create is disabled")]
    NoPeriodSelected,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    #[error(
        "Commit produced no records: {failed} draft(s) failed, {skipped} skipped"
    )]
    PartialCommitFailure { failed: u64, skipped: u64 },
}
