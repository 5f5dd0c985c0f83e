use crate::error::RepositoryError;
use async_trait::async_trait;
use model::entities::{Activity, PeriodKey, ReportingPeriod, Site};

pub mod json_store;
pub mod memory;

/// Result of persisting one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// The idempotency key already existed; treated as a no-op success.
    Duplicate,
}

/// Storage boundary for the import committer. Implementations must be safe
/// to share across concurrently running uploads; calls are presumed to
/// block, and a failed call is reported to the caller rather than retried
/// here so partial-failure accounting stays exact.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Case-insensitive exact name match.
    async fn find_site_by_name(&self, name: &str) -> Result<Option<Site>, RepositoryError>;

    async fn insert_site(&self, site: Site) -> Result<(), RepositoryError>;

    async fn find_period(&self, key: PeriodKey)
    -> Result<Option<ReportingPeriod>, RepositoryError>;

    async fn insert_period(&self, period: ReportingPeriod) -> Result<(), RepositoryError>;

    /// Inserts keyed on `activity.idempotency_key`; an existing key is a
    /// duplicate no-op, not an error.
    async fn insert_activity(&self, activity: Activity)
    -> Result<InsertOutcome, RepositoryError>;

    /// Snapshot of all persisted activities, for reporting and tests.
    async fn activities(&self) -> Result<Vec<Activity>, RepositoryError>;
}
