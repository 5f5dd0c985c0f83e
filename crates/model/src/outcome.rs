use crate::activity::ActivityDraft;
use crate::issue::Issue;
use serde::{Deserialize, Serialize};

/// One data row as read from the file, header excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based, counted over data rows only.
    pub index: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(index: usize, fields: Vec<String>) -> Self {
        RawRow { index, fields }
    }

    pub fn get(&self, column: usize) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Validation outcome for one row. Warnings keep the draft; errors drop it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RowOutcome {
    Valid(ActivityDraft),
    Warning(ActivityDraft, Vec<Issue>),
    Error(Vec<Issue>),
}

impl RowOutcome {
    /// Valid for counting purposes: warnings do not disqualify a row.
    pub fn is_valid(&self) -> bool {
        !matches!(self, RowOutcome::Error(_))
    }

    pub fn has_warnings(&self) -> bool {
        matches!(self, RowOutcome::Warning(_, _))
    }

    pub fn draft(&self) -> Option<&ActivityDraft> {
        match self {
            RowOutcome::Valid(draft) | RowOutcome::Warning(draft, _) => Some(draft),
            RowOutcome::Error(_) => None,
        }
    }

    pub fn into_draft(self) -> Option<ActivityDraft> {
        match self {
            RowOutcome::Valid(draft) | RowOutcome::Warning(draft, _) => Some(draft),
            RowOutcome::Error(_) => None,
        }
    }

    pub fn issues(&self) -> &[Issue] {
        match self {
            RowOutcome::Valid(_) => &[],
            RowOutcome::Warning(_, issues) | RowOutcome::Error(issues) => issues,
        }
    }
}
