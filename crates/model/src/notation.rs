use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a quantity is absent rather than zero, per GHG-reporting notation
/// keys. Rows carrying one of these stay valid but are excluded from every
/// numeric total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// NO, NA, IE: the activity did not occur, does not apply, or is
    /// accounted for elsewhere.
    NotApplicable,
    /// NE: occurring but not estimated.
    NotEstimated,
    /// C: withheld as confidential.
    Confidential,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExclusionReason::NotApplicable => "not_applicable",
            ExclusionReason::NotEstimated => "not_estimated",
            ExclusionReason::Confidential => "confidential",
        };
        write!(f, "{name}")
    }
}

/// Outcome of interpreting one raw quantity cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotationDecision {
    /// Plain numeric value.
    Numeric(f64),
    /// Recognized notation key: null quantity, tagged as excluded.
    Excluded(ExclusionReason),
    /// Neither numeric nor a recognized token. Blanks land here too; a blank
    /// quantity is an error, never a silent zero.
    Unresolved,
}
