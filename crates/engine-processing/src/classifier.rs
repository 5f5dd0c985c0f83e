use crate::notation::NotationResolver;
use crate::validator::parse_date;
use engine_config::{InferenceTables, normalize_key};
use model::activity::Scope;
use model::mapping::{ColumnMapping, MappedColumn, SemanticRole};
use model::notation::NotationDecision;
use model::outcome::RawRow;
use std::collections::BTreeSet;
use tracing::debug;

/// Assigns a semantic role to each input column by scoring header-name
/// similarity against the configured keyword table plus content-shape
/// signals over a bounded row sample. Columns below the confidence floor
/// stay unmapped and pass through into notes.
pub struct ColumnClassifier<'a> {
    tables: &'a InferenceTables,
}

impl<'a> ColumnClassifier<'a> {
    pub fn new(tables: &'a InferenceTables) -> Self {
        ColumnClassifier { tables }
    }

    pub fn classify(&self, headers: &[String], sample: &[RawRow]) -> ColumnMapping {
        let weights = &self.tables.weights;
        let mut columns = Vec::with_capacity(headers.len());
        let mut scores = Vec::with_capacity(headers.len());

        for (index, header) in headers.iter().enumerate() {
            let values = column_values(sample, index, weights.sample_cap);
            let shape = ShapeSignal::of(&values);

            let mut best_role = SemanticRole::Unmapped;
            let mut best_score = 0.0f32;
            for rk in &self.tables.role_keywords {
                let mut score = self.header_score(header, &rk.keywords);
                score += shape.boost_for(rk.role) * weights.shape_boost;
                // Strictly greater: on a tie the earlier table entry wins.
                if score > best_score {
                    best_score = score;
                    best_role = rk.role;
                }
            }

            let role = if best_score >= weights.confidence_floor {
                best_role
            } else {
                SemanticRole::Unmapped
            };
            debug!(column = %header, %role, score = best_score, "Classified column");
            columns.push(MappedColumn {
                index,
                header: header.clone(),
                role,
            });
            scores.push(best_score);
        }

        demote_duplicate_roles(&mut columns, &scores);
        ColumnMapping::new(columns)
    }

    fn header_score(&self, header: &str, keywords: &[String]) -> f32 {
        let weights = &self.tables.weights;
        let normalized = normalize_key(header);
        if normalized.is_empty() {
            return 0.0;
        }
        let mut score = 0.0f32;
        for keyword in keywords {
            let key = normalize_key(keyword);
            if key.is_empty() {
                continue;
            }
            if normalized == key {
                return weights.header_exact;
            }
            if normalized.contains(&key) {
                score = score.max(weights.header_partial);
            }
        }
        score
    }
}

/// At most one column per exclusive role: the highest-scoring claimant
/// keeps it, the leftmost wins a score tie, the rest fall back to unmapped.
fn demote_duplicate_roles(columns: &mut [MappedColumn], scores: &[f32]) {
    let roles: BTreeSet<SemanticRole> = columns
        .iter()
        .filter(|c| c.role.is_exclusive())
        .map(|c| c.role)
        .collect();

    for role in roles {
        let winner = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role == role)
            .max_by(|(ia, _), (ib, _)| {
                scores[*ia]
                    .partial_cmp(&scores[*ib])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // Prefer the leftmost on equal score.
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i);

        if let Some(winner) = winner {
            for (i, column) in columns.iter_mut().enumerate() {
                if column.role == role && i != winner {
                    column.role = SemanticRole::Unmapped;
                }
            }
        }
    }
}

fn column_values(sample: &[RawRow], index: usize, cap: usize) -> Vec<String> {
    sample
        .iter()
        .take(cap)
        .map(|row| row.get(index).trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Content-shape signal extracted from one column's sample values.
struct ShapeSignal {
    numeric_frac: f32,
    date_frac: f32,
    scope_frac: f32,
    /// Small set of short repeating tokens, the shape of a category column.
    categorical: bool,
}

impl ShapeSignal {
    fn of(values: &[String]) -> Self {
        if values.is_empty() {
            return ShapeSignal {
                numeric_frac: 0.0,
                date_frac: 0.0,
                scope_frac: 0.0,
                categorical: false,
            };
        }
        let total = values.len() as f32;
        let numeric = values
            .iter()
            .filter(|v| matches!(NotationResolver::resolve(v), NotationDecision::Numeric(_)))
            .count() as f32;
        let dates = values.iter().filter(|v| parse_date(v).is_some()).count() as f32;
        let scopes = values
            .iter()
            .filter(|v| Scope::parse_lenient(v).is_some())
            .count() as f32;

        let distinct: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let short_tokens = values.iter().all(|v| v.len() <= 40);
        let categorical = short_tokens
            && distinct.len() <= (values.len() / 2).max(3)
            && numeric / total < 0.5;

        ShapeSignal {
            numeric_frac: numeric / total,
            date_frac: dates / total,
            scope_frac: scopes / total,
            categorical,
        }
    }

    fn boost_for(&self, role: SemanticRole) -> f32 {
        match role {
            SemanticRole::Quantity => {
                if self.numeric_frac >= 0.8 {
                    1.0
                } else {
                    0.0
                }
            }
            // Bare years parse as dates too; require a non-numeric majority
            // so quantity columns don't double as dates.
            SemanticRole::Date => {
                if self.date_frac >= 0.8 && self.numeric_frac < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            SemanticRole::Scope => {
                if self.scope_frac >= 0.8 {
                    1.0
                } else {
                    0.0
                }
            }
            SemanticRole::ActivityType => {
                if self.categorical && self.scope_frac < 0.5 && self.date_frac < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<RawRow> {
        data.iter()
            .enumerate()
            .map(|(i, fields)| {
                RawRow::new(i + 1, fields.iter().map(|f| f.to_string()).collect())
            })
            .collect()
    }

    fn classify(headers: &[&str], sample: &[RawRow]) -> ColumnMapping {
        let tables = InferenceTables::default();
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        ColumnClassifier::new(&tables).classify(&headers, sample)
    }

    #[test]
    fn test_well_formed_header_maps_all_roles() {
        let sample = rows(&[
            &["2024-01-15", "Main Office", "ELECTRICITY", "SCOPE_2", "1500", "kWh"],
            &["2024-02-15", "Main Office", "ELECTRICITY", "SCOPE_2", "1300", "kWh"],
        ]);
        let mapping = classify(
            &["Date", "Site", "Activity Type", "Scope", "Quantity", "Unit"],
            &sample,
        );

        assert_eq!(mapping.index_of(SemanticRole::Date), Some(0));
        assert_eq!(mapping.index_of(SemanticRole::Site), Some(1));
        assert_eq!(mapping.index_of(SemanticRole::ActivityType), Some(2));
        assert_eq!(mapping.index_of(SemanticRole::Scope), Some(3));
        assert_eq!(mapping.index_of(SemanticRole::Quantity), Some(4));
        assert_eq!(mapping.index_of(SemanticRole::Unit), Some(5));
        assert!(mapping.is_usable());
    }

    #[test]
    fn test_keyword_match_is_order_independent() {
        let sample = rows(&[&["1500", "ELECTRICITY"], &["900", "GAS"]]);
        let mapping = classify(&["qty", "emission source"], &sample);

        assert_eq!(mapping.index_of(SemanticRole::Quantity), Some(0));
        assert_eq!(mapping.index_of(SemanticRole::ActivityType), Some(1));
    }

    #[test]
    fn test_unknown_column_stays_unmapped() {
        let sample = rows(&[&["ELECTRICITY", "1500", "xzkw-42"]]);
        let mapping = classify(&["Activity", "Amount", "internal ref"], &sample);

        assert_eq!(
            mapping.columns[2].role,
            SemanticRole::Unmapped,
            "{mapping:?}"
        );
        assert!(mapping.is_usable());
    }

    #[test]
    fn test_duplicate_role_keeps_leftmost() {
        let sample = rows(&[&["100", "200", "ELECTRICITY"]]);
        let mapping = classify(&["Quantity", "Qty", "Type"], &sample);

        assert_eq!(mapping.index_of(SemanticRole::Quantity), Some(0));
        assert_eq!(mapping.columns[1].role, SemanticRole::Unmapped);
    }

    #[test]
    fn test_missing_mandatory_role_is_unusable() {
        let sample = rows(&[&["2024-01-01", "Main"]]);
        let mapping = classify(&["Date", "Site"], &sample);

        assert!(!mapping.is_usable());
        assert_eq!(
            mapping.missing_roles(),
            vec![SemanticRole::Quantity, SemanticRole::ActivityType]
        );
    }

    #[test]
    fn test_headerless_numeric_column_found_by_shape() {
        let tables = InferenceTables::default();
        let headers = vec!["column_1".to_string(), "column_2".to_string()];
        let sample = rows(&[&["ELECTRICITY", "1500"], &["GAS", "900"]]);
        let mapping = ColumnClassifier::new(&tables).classify(&headers, &sample);

        assert_eq!(mapping.index_of(SemanticRole::Quantity), Some(1));
    }
}
