use crate::notation::ExclusionReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GHG Protocol emission scope.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Scope1,
    Scope2,
    Scope3,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Scope1 => "SCOPE_1",
            Scope::Scope2 => "SCOPE_2",
            Scope::Scope3 => "SCOPE_3",
        }
    }

    /// Lenient parse: strips non-alphanumerics and case-folds, so
    /// "SCOPE_2", "scope 2", "s2" and "2" all resolve.
    pub fn parse_lenient(raw: &str) -> Option<Scope> {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "scope1" | "s1" | "1" => Some(Scope::Scope1),
            "scope2" | "s2" | "2" => Some(Scope::Scope2),
            "scope3" | "s3" | "3" => Some(Scope::Scope3),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One validated row, not yet resolved against persisted entities.
/// Produced by the validator, consumed by the committer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityDraft {
    /// Site name as written in the file (or the pipeline default); resolved
    /// to a Site entity only at commit time.
    pub site_ref: String,
    pub period_year: i32,
    pub period_quarter: Option<u8>,
    pub activity_type: String,
    pub scope: Scope,
    /// None when a notation key excluded the value.
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion: Option<ExclusionReason>,
    pub unit: String,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub notes: String,
}

impl ActivityDraft {
    /// Whether the quantity participates in numeric totals.
    pub fn counts_toward_totals(&self) -> bool {
        self.quantity.is_some() && self.exclusion.is_none()
    }
}
