use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic role assigned to one input column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    Date,
    Site,
    ActivityType,
    Scope,
    Quantity,
    Unit,
    Notes,
    Unmapped,
}

impl SemanticRole {
    /// Roles that may be claimed by at most one column.
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, SemanticRole::Notes | SemanticRole::Unmapped)
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticRole::Date => "date",
            SemanticRole::Site => "site",
            SemanticRole::ActivityType => "activity_type",
            SemanticRole::Scope => "scope",
            SemanticRole::Quantity => "quantity",
            SemanticRole::Unit => "unit",
            SemanticRole::Notes => "notes",
            SemanticRole::Unmapped => "unmapped",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedColumn {
    pub index: usize,
    pub header: String,
    pub role: SemanticRole,
}

/// Ordered column → role assignment, computed once per upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub columns: Vec<MappedColumn>,
}

impl ColumnMapping {
    pub fn new(columns: Vec<MappedColumn>) -> Self {
        ColumnMapping { columns }
    }

    /// Index of the column holding `role`, if any.
    pub fn index_of(&self, role: SemanticRole) -> Option<usize> {
        self.columns.iter().find(|c| c.role == role).map(|c| c.index)
    }

    pub fn header_of(&self, role: SemanticRole) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.role == role)
            .map(|c| c.header.as_str())
    }

    /// Columns carried through into notes rather than validated.
    pub fn passthrough_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .filter(|c| matches!(c.role, SemanticRole::Notes | SemanticRole::Unmapped))
            .map(|c| c.index)
            .collect()
    }

    /// A mapping is usable only when both mandatory roles were detected.
    pub fn is_usable(&self) -> bool {
        self.index_of(SemanticRole::Quantity).is_some()
            && self.index_of(SemanticRole::ActivityType).is_some()
    }

    /// Mandatory roles still missing, for schema-rejection reporting.
    pub fn missing_roles(&self) -> Vec<SemanticRole> {
        [SemanticRole::Quantity, SemanticRole::ActivityType]
            .into_iter()
            .filter(|role| self.index_of(*role).is_none())
            .collect()
    }
}
