use crate::error::ConfigError;
use model::activity::Scope;
use model::mapping::SemanticRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Normalizes a header or activity-type key for table lookup: strips
/// everything but ASCII alphanumerics and case-folds.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Scoring knobs for the column classifier. Tuned defaults; deployments can
/// override them together with the keyword tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierWeights {
    /// Header equals a keyword after normalization.
    pub header_exact: f32,
    /// Normalized header contains a keyword (or vice versa).
    pub header_partial: f32,
    /// Content-shape signal (numeric sample, date-parseable sample, small
    /// token cardinality).
    pub shape_boost: f32,
    /// Columns scoring below this for every role stay unmapped.
    pub confidence_floor: f32,
    /// Data rows inspected for content-shape signals.
    pub sample_cap: usize,
}

impl Default for ClassifierWeights {
    fn default() -> Self {
        ClassifierWeights {
            header_exact: 3.0,
            header_partial: 1.5,
            shape_boost: 1.0,
            confidence_floor: 1.0,
            sample_cap: 20,
        }
    }
}

/// Keywords recognized for one semantic role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleKeywords {
    pub role: SemanticRole,
    pub keywords: Vec<String>,
}

/// Configurable inference data: role-keyword table for column
/// classification plus the activity-type → scope and activity-type → unit
/// fallback tables. The built-in defaults are data, not contract; load a
/// JSON override with [`InferenceTables::from_json_file`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceTables {
    pub role_keywords: Vec<RoleKeywords>,
    /// Keys are matched after [`normalize_key`].
    pub type_scope: BTreeMap<String, Scope>,
    pub type_unit: BTreeMap<String, String>,
    pub weights: ClassifierWeights,
}

impl Default for InferenceTables {
    fn default() -> Self {
        InferenceTables {
            role_keywords: default_role_keywords(),
            type_scope: default_type_scope(),
            type_unit: default_type_unit(),
            weights: ClassifierWeights::default(),
        }
    }
}

impl InferenceTables {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        let tables: InferenceTables = serde_json::from_str(&source)?;
        tables.check()?;
        info!(path = %path.display(), "Loaded inference-table overrides");
        Ok(tables)
    }

    /// Rejects tables that cannot classify the two mandatory roles.
    pub fn check(&self) -> Result<(), ConfigError> {
        for role in [SemanticRole::Quantity, SemanticRole::ActivityType] {
            let covered = self
                .role_keywords
                .iter()
                .any(|rk| rk.role == role && !rk.keywords.is_empty());
            if !covered {
                return Err(ConfigError::InvalidTable(format!(
                    "no keywords configured for mandatory role `{role}`"
                )));
            }
        }
        Ok(())
    }

    /// Scope fallback for an activity type. Exact normalized match first,
    /// then a substring scan so "Electricity - grid" still hits
    /// "electricity".
    pub fn scope_for_type(&self, activity_type: &str) -> Option<Scope> {
        let key = normalize_key(activity_type);
        if let Some(scope) = self.type_scope.get(&key) {
            return Some(*scope);
        }
        self.type_scope
            .iter()
            .find(|(k, _)| key.contains(k.as_str()))
            .map(|(_, scope)| *scope)
    }

    /// Default unit for an activity type, same matching rules as
    /// [`scope_for_type`].
    pub fn unit_for_type(&self, activity_type: &str) -> Option<&str> {
        let key = normalize_key(activity_type);
        if let Some(unit) = self.type_unit.get(&key) {
            return Some(unit.as_str());
        }
        self.type_unit
            .iter()
            .find(|(k, _)| key.contains(k.as_str()))
            .map(|(_, unit)| unit.as_str())
    }
}

fn keywords(role: SemanticRole, words: &[&str]) -> RoleKeywords {
    RoleKeywords {
        role,
        keywords: words.iter().map(|w| w.to_string()).collect(),
    }
}

fn default_role_keywords() -> Vec<RoleKeywords> {
    vec![
        keywords(
            SemanticRole::Date,
            &["date", "day", "month", "start date", "end date", "period start"],
        ),
        keywords(
            SemanticRole::Site,
            &["site", "location", "facility", "office", "building", "branch"],
        ),
        keywords(
            SemanticRole::ActivityType,
            &[
                "activity type",
                "activity",
                "type",
                "category",
                "emission source",
                "source",
            ],
        ),
        keywords(SemanticRole::Scope, &["scope", "ghg scope", "emission scope"]),
        keywords(
            SemanticRole::Quantity,
            &[
                "quantity",
                "qty",
                "amount",
                "value",
                "consumption",
                "usage",
                "volume",
            ],
        ),
        keywords(
            SemanticRole::Unit,
            &["unit", "units", "uom", "unit of measure", "measure"],
        ),
        keywords(
            SemanticRole::Notes,
            &["notes", "note", "comment", "comments", "description", "remarks"],
        ),
    ]
}

fn default_type_scope() -> BTreeMap<String, Scope> {
    let entries = [
        ("electricity", Scope::Scope2),
        ("districtheating", Scope::Scope2),
        ("steam", Scope::Scope2),
        ("naturalgas", Scope::Scope1),
        ("gas", Scope::Scope1),
        ("diesel", Scope::Scope1),
        ("petrol", Scope::Scope1),
        ("fuel", Scope::Scope1),
        ("refrigerants", Scope::Scope1),
        ("flights", Scope::Scope3),
        ("airtravel", Scope::Scope3),
        ("travel", Scope::Scope3),
        ("commuting", Scope::Scope3),
        ("freight", Scope::Scope3),
        ("waste", Scope::Scope3),
        ("water", Scope::Scope3),
        ("purchasedgoods", Scope::Scope3),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn default_type_unit() -> BTreeMap<String, String> {
    let entries = [
        ("electricity", "kWh"),
        ("districtheating", "kWh"),
        ("steam", "kWh"),
        ("naturalgas", "kWh"),
        ("gas", "kWh"),
        ("diesel", "litres"),
        ("petrol", "litres"),
        ("fuel", "litres"),
        ("refrigerants", "kg"),
        ("flights", "km"),
        ("airtravel", "km"),
        ("travel", "km"),
        ("commuting", "km"),
        ("freight", "tonne-km"),
        ("waste", "tonnes"),
        ("water", "m3"),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
