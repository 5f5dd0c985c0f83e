use crate::issue::Issue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exact per-draft accounting of one commit. Never an opaque success flag:
/// created, reused, skipped and failed are reported separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total_parsed: u64,
    /// Newly created activity records.
    pub total_imported: u64,
    /// Duplicate no-ops: idempotency key already present.
    pub total_duplicates: u64,
    /// Drafts rejected before persistence (e.g. unknown site without
    /// auto-create).
    pub total_skipped: u64,
    /// Drafts whose persistence call failed; siblings are unaffected.
    pub total_failed: u64,
    /// Machine-readable reason per skipped draft (e.g. `SITE_NOT_FOUND`
    /// with the offending site name as the value).
    pub skip_reasons: Vec<Issue>,
    pub created_site_ids: Vec<Uuid>,
    pub created_period_ids: Vec<Uuid>,
    pub message: String,
}
