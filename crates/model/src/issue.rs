use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Warning,
    Error,
}

/// Closed set of row diagnostic codes. Stable programmatic ids; tests and
/// callers match on these, never on message text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    MissingActivityType,
    MissingQuantity,
    InvalidQuantity,
    UnresolvedNotation,
    BadDate,
    InferredYear,
    ScopeInferred,
    ScopeDefaulted,
    UnitMissing,
    SiteNotFound,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::MissingActivityType => "MISSING_ACTIVITY_TYPE",
            IssueCode::MissingQuantity => "MISSING_QUANTITY",
            IssueCode::InvalidQuantity => "INVALID_QUANTITY",
            IssueCode::UnresolvedNotation => "UNRESOLVED_NOTATION",
            IssueCode::BadDate => "BAD_DATE",
            IssueCode::InferredYear => "INFERRED_YEAR",
            IssueCode::ScopeInferred => "SCOPE_INFERRED",
            IssueCode::ScopeDefaulted => "SCOPE_DEFAULTED",
            IssueCode::UnitMissing => "UNIT_MISSING",
            IssueCode::SiteNotFound => "SITE_NOT_FOUND",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::MissingActivityType
            | IssueCode::MissingQuantity
            | IssueCode::InvalidQuantity
            | IssueCode::UnresolvedNotation
            | IssueCode::BadDate => Severity::Error,
            IssueCode::InferredYear
            | IssueCode::ScopeInferred
            | IssueCode::ScopeDefaulted
            | IssueCode::UnitMissing
            | IssueCode::SiteNotFound => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One diagnostic attached to a row: the code, the offending column/value
/// and a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub code: IssueCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Issue {
            code,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_are_stable() {
        assert_eq!(IssueCode::InvalidQuantity.as_str(), "INVALID_QUANTITY");
        assert_eq!(IssueCode::ScopeDefaulted.as_str(), "SCOPE_DEFAULTED");
        assert_eq!(
            serde_json::to_string(&IssueCode::BadDate).unwrap(),
            "\"BAD_DATE\""
        );
    }

    #[test]
    fn test_severity_split() {
        assert_eq!(IssueCode::BadDate.severity(), Severity::Error);
        assert_eq!(IssueCode::InferredYear.severity(), Severity::Warning);
        assert_eq!(IssueCode::UnitMissing.severity(), Severity::Warning);
    }
}
