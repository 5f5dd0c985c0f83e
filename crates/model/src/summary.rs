use crate::activity::Scope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated view of one parse pass. Derived data: always recomputed from
/// the row outcome set, never persisted as source of truth.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    pub total_rows: u64,
    /// Rows that produced a draft; includes warning rows.
    pub valid_rows: u64,
    pub warning_rows: u64,
    pub error_rows: u64,
    /// (min, max) year across valid and warning rows.
    pub year_range: Option<(i32, i32)>,
    pub counts_by_activity_type: BTreeMap<String, u64>,
    pub counts_by_scope: BTreeMap<Scope, u64>,
}
