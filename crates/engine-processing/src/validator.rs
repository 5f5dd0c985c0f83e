use crate::notation::NotationResolver;
use chrono::{Datelike, NaiveDate, Utc};
use engine_config::{InferenceTables, ParseOptions};
use model::activity::{ActivityDraft, Scope};
use model::issue::{Issue, IssueCode};
use model::mapping::{ColumnMapping, SemanticRole};
use model::notation::{ExclusionReason, NotationDecision};
use model::outcome::{RawRow, RowOutcome};

/// A parsed date cell: either a full day or a bare year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedDate {
    Day(NaiveDate),
    Year(i32),
}

/// Accepted formats: ISO, day-first, month-first, bare year. Day-first is
/// tried before month-first when both could apply.
pub fn parse_date(raw: &str) -> Option<ParsedDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(ParsedDate::Day(date));
        }
    }
    if let Ok(year) = trimmed.parse::<i32>()
        && (1900..=2100).contains(&year)
    {
        return Some(ParsedDate::Year(year));
    }
    None
}

/// Validates one raw row against a resolved column mapping, producing a
/// graded outcome. Hard failures (missing activity type, unusable quantity,
/// bad date) make the row an error; everything else degrades to warnings on
/// a still-importable draft.
pub struct RowValidator<'a> {
    mapping: &'a ColumnMapping,
    tables: &'a InferenceTables,
    options: &'a ParseOptions,
    fallback_year: i32,
}

impl<'a> RowValidator<'a> {
    pub fn new(
        mapping: &'a ColumnMapping,
        tables: &'a InferenceTables,
        options: &'a ParseOptions,
    ) -> Self {
        let fallback_year = options.default_year.unwrap_or_else(|| Utc::now().year());
        RowValidator {
            mapping,
            tables,
            options,
            fallback_year,
        }
    }

    pub fn validate(&self, row: &RawRow) -> RowOutcome {
        let mut errors: Vec<Issue> = Vec::new();
        let mut warnings: Vec<Issue> = Vec::new();

        // 1. Activity type is mandatory; nothing else is checkable without it.
        let activity_type = self.cell(row, SemanticRole::ActivityType);
        if activity_type.is_empty() {
            return RowOutcome::Error(vec![
                Issue::new(IssueCode::MissingActivityType, "activity type is empty")
                    .with_column(self.header(SemanticRole::ActivityType)),
            ]);
        }

        // 2. Quantity through the notation resolver. Excluded rows stay
        // valid with a null quantity; they never become zero.
        let quantity_raw = self.cell(row, SemanticRole::Quantity);
        let mut quantity: Option<f64> = None;
        let mut exclusion: Option<ExclusionReason> = None;
        match NotationResolver::resolve(quantity_raw) {
            NotationDecision::Numeric(value) => quantity = Some(value),
            NotationDecision::Excluded(reason) => exclusion = Some(reason),
            NotationDecision::Unresolved => {
                let (code, message) = if quantity_raw.trim().is_empty() {
                    (IssueCode::MissingQuantity, "quantity is empty")
                } else if NotationResolver::looks_like_token(quantity_raw) {
                    (
                        IssueCode::UnresolvedNotation,
                        "unrecognized notation key",
                    )
                } else {
                    (
                        IssueCode::InvalidQuantity,
                        "quantity is neither numeric nor a notation key",
                    )
                };
                errors.push(
                    Issue::new(code, message)
                        .with_column(self.header(SemanticRole::Quantity))
                        .with_value(quantity_raw),
                );
            }
        }

        // 3. Date, or an inferred year when the file has none.
        let mut period_year = self.fallback_year;
        let mut date_start: Option<NaiveDate> = None;
        let date_raw = self.cell(row, SemanticRole::Date);
        if self.mapping.index_of(SemanticRole::Date).is_none() || date_raw.trim().is_empty() {
            warnings.push(Issue::new(
                IssueCode::InferredYear,
                format!("no date available, assuming year {}", self.fallback_year),
            ));
        } else {
            match parse_date(date_raw) {
                Some(ParsedDate::Day(date)) => {
                    period_year = date.year();
                    date_start = Some(date);
                }
                Some(ParsedDate::Year(year)) => period_year = year,
                None => {
                    errors.push(
                        Issue::new(IssueCode::BadDate, "unparseable date")
                            .with_column(self.header(SemanticRole::Date))
                            .with_value(date_raw),
                    );
                }
            }
        }

        if !errors.is_empty() {
            return RowOutcome::Error(errors);
        }

        // 4. Scope: explicit, inferred from the activity type, or defaulted.
        let scope = self.resolve_scope(row, activity_type, &mut warnings);

        // 5. Unit: explicit or inferred; an empty unit stays importable.
        let unit = self.resolve_unit(row, activity_type, &mut warnings);

        // 6. Site never hard-errors; absent data falls back to the
        // pipeline-level default.
        let site_raw = self.cell(row, SemanticRole::Site);
        let site_ref = if site_raw.trim().is_empty() {
            self.options.default_site.clone()
        } else {
            site_raw.trim().to_string()
        };

        let draft = ActivityDraft {
            site_ref,
            period_year,
            period_quarter: None,
            activity_type: activity_type.trim().to_string(),
            scope,
            quantity,
            exclusion,
            unit,
            date_start,
            date_end: None,
            notes: self.passthrough_notes(row),
        };

        if warnings.is_empty() {
            RowOutcome::Valid(draft)
        } else {
            RowOutcome::Warning(draft, warnings)
        }
    }

    fn resolve_scope(
        &self,
        row: &RawRow,
        activity_type: &str,
        warnings: &mut Vec<Issue>,
    ) -> Scope {
        let has_column = self.mapping.index_of(SemanticRole::Scope).is_some();
        let scope_raw = self.cell(row, SemanticRole::Scope);

        if has_column && let Some(scope) = Scope::parse_lenient(scope_raw) {
            return scope;
        }

        let inferred = self.tables.scope_for_type(activity_type);
        match (has_column, inferred) {
            // Unusable value in an existing column, but the type table knows.
            (true, Some(scope)) => {
                warnings.push(
                    Issue::new(
                        IssueCode::ScopeInferred,
                        format!("scope inferred from activity type as {scope}"),
                    )
                    .with_column(self.header(SemanticRole::Scope))
                    .with_value(scope_raw),
                );
                scope
            }
            // No scope data at all: table lookup or the scope-3 default.
            (false, Some(scope)) => {
                warnings.push(Issue::new(
                    IssueCode::ScopeDefaulted,
                    format!("no scope column, defaulted from activity type to {scope}"),
                ));
                scope
            }
            (_, None) => {
                warnings.push(Issue::new(
                    IssueCode::ScopeDefaulted,
                    "unknown activity type, scope defaulted to SCOPE_3",
                ));
                Scope::Scope3
            }
        }
    }

    fn resolve_unit(
        &self,
        row: &RawRow,
        activity_type: &str,
        warnings: &mut Vec<Issue>,
    ) -> String {
        let unit_raw = self.cell(row, SemanticRole::Unit).trim();
        if !unit_raw.is_empty() {
            return unit_raw.to_string();
        }
        match self.tables.unit_for_type(activity_type) {
            Some(unit) => unit.to_string(),
            None => {
                warnings.push(Issue::new(
                    IssueCode::UnitMissing,
                    "no unit given and none known for this activity type",
                ));
                String::new()
            }
        }
    }

    /// Notes role plus unmapped columns, preserved rather than dropped.
    fn passthrough_notes(&self, row: &RawRow) -> String {
        let mut parts = Vec::new();
        for index in self.mapping.passthrough_indices() {
            let value = row.get(index).trim();
            if !value.is_empty() {
                parts.push(value.to_string());
            }
        }
        parts.join("; ")
    }

    fn cell<'b>(&self, row: &'b RawRow, role: SemanticRole) -> &'b str {
        match self.mapping.index_of(role) {
            Some(index) => row.get(index),
            None => "",
        }
    }

    fn header(&self, role: SemanticRole) -> &str {
        self.mapping.header_of(role).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::mapping::MappedColumn;

    fn mapping(roles: &[(usize, &str, SemanticRole)]) -> ColumnMapping {
        ColumnMapping::new(
            roles
                .iter()
                .map(|(index, header, role)| MappedColumn {
                    index: *index,
                    header: header.to_string(),
                    role: *role,
                })
                .collect(),
        )
    }

    fn full_mapping() -> ColumnMapping {
        mapping(&[
            (0, "Date", SemanticRole::Date),
            (1, "Site", SemanticRole::Site),
            (2, "Activity Type", SemanticRole::ActivityType),
            (3, "Scope", SemanticRole::Scope),
            (4, "Quantity", SemanticRole::Quantity),
            (5, "Unit", SemanticRole::Unit),
        ])
    }

    fn row(fields: &[&str]) -> RawRow {
        RawRow::new(1, fields.iter().map(|f| f.to_string()).collect())
    }

    fn validate(mapping: &ColumnMapping, fields: &[&str]) -> RowOutcome {
        let tables = InferenceTables::default();
        let options = ParseOptions::default().with_default_year(2024);
        RowValidator::new(mapping, &tables, &options).validate(&row(fields))
    }

    #[test]
    fn test_clean_row_is_valid() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["2024-01-15", "Main Office", "ELECTRICITY", "SCOPE_2", "1500", "kWh"],
        );

        let RowOutcome::Valid(draft) = outcome else {
            panic!("expected valid outcome, got {outcome:?}");
        };
        assert_eq!(draft.quantity, Some(1500.0));
        assert_eq!(draft.unit, "kWh");
        assert_eq!(draft.scope, Scope::Scope2);
        assert_eq!(draft.period_year, 2024);
        assert_eq!(draft.site_ref, "Main Office");
        assert_eq!(
            draft.date_start,
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_missing_activity_type_short_circuits() {
        let mapping = full_mapping();
        let outcome = validate(&mapping, &["2024-01-15", "Main", "", "bad", "xx", "kWh"]);

        let RowOutcome::Error(issues) = outcome else {
            panic!("expected error outcome");
        };
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::MissingActivityType);
    }

    #[test]
    fn test_notation_key_row_stays_valid_and_excluded() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["2024-01-15", "Main", "ELECTRICITY", "SCOPE_2", "NO", "kWh"],
        );

        let RowOutcome::Valid(draft) = outcome else {
            panic!("expected valid outcome, got {outcome:?}");
        };
        assert_eq!(draft.quantity, None);
        assert_eq!(draft.exclusion, Some(ExclusionReason::NotApplicable));
        assert!(!draft.counts_toward_totals());
    }

    #[test]
    fn test_garbage_quantity_is_invalid() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["2024-01-15", "Main", "ELECTRICITY", "SCOPE_2", "abc", "kWh"],
        );

        let RowOutcome::Error(issues) = outcome else {
            panic!("expected error outcome");
        };
        assert_eq!(issues[0].code, IssueCode::InvalidQuantity);
        assert_eq!(issues[0].value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_blank_quantity_and_unknown_token() {
        let mapping = full_mapping();

        let outcome = validate(&mapping, &["2024-01-15", "M", "GAS", "SCOPE_1", "", "kWh"]);
        assert_eq!(
            outcome.issues()[0].code,
            IssueCode::MissingQuantity,
            "{outcome:?}"
        );

        let outcome = validate(&mapping, &["2024-01-15", "M", "GAS", "SCOPE_1", "ZZ", "kWh"]);
        assert_eq!(outcome.issues()[0].code, IssueCode::UnresolvedNotation);
    }

    #[test]
    fn test_bad_date_is_error() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["someday", "Main", "ELECTRICITY", "SCOPE_2", "10", "kWh"],
        );

        let RowOutcome::Error(issues) = outcome else {
            panic!("expected error outcome");
        };
        assert_eq!(issues[0].code, IssueCode::BadDate);
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(
            parse_date("2024-01-15"),
            Some(ParsedDate::Day(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );
        assert_eq!(
            parse_date("15/01/2024"),
            Some(ParsedDate::Day(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );
        // Day-first wins when both readings are plausible.
        assert_eq!(
            parse_date("03/04/2024"),
            Some(ParsedDate::Day(NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()))
        );
        // Month-first still accepted when day-first cannot apply.
        assert_eq!(
            parse_date("01/25/2024"),
            Some(ParsedDate::Day(NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()))
        );
        assert_eq!(parse_date("2024"), Some(ParsedDate::Year(2024)));
        assert_eq!(parse_date("1500"), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_missing_date_column_infers_year() {
        let mapping = mapping(&[
            (0, "Activity Type", SemanticRole::ActivityType),
            (1, "Quantity", SemanticRole::Quantity),
        ]);
        let outcome = validate(&mapping, &["ELECTRICITY", "42"]);

        assert!(outcome.is_valid());
        assert!(outcome.has_warnings());
        let codes: Vec<_> = outcome.issues().iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::InferredYear));
        assert_eq!(outcome.draft().unwrap().period_year, 2024);
    }

    #[test]
    fn test_missing_scope_column_defaults_from_lookup() {
        let mapping = mapping(&[
            (0, "Date", SemanticRole::Date),
            (1, "Activity Type", SemanticRole::ActivityType),
            (2, "Quantity", SemanticRole::Quantity),
            (3, "Unit", SemanticRole::Unit),
        ]);
        let outcome = validate(&mapping, &["2024-01-15", "ELECTRICITY", "1500", "kWh"]);

        assert!(outcome.is_valid());
        let codes: Vec<_> = outcome.issues().iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::ScopeDefaulted), "{codes:?}");
        assert_eq!(outcome.draft().unwrap().scope, Scope::Scope2);
    }

    #[test]
    fn test_bad_scope_value_is_inferred() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["2024-01-15", "Main", "ELECTRICITY", "??", "1500", "kWh"],
        );

        let codes: Vec<_> = outcome.issues().iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::ScopeInferred));
        assert_eq!(outcome.draft().unwrap().scope, Scope::Scope2);
    }

    #[test]
    fn test_unknown_type_scope_defaults_to_three() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["2024-01-15", "Main", "BASKET WEAVING", "??", "5", ""],
        );

        let codes: Vec<_> = outcome.issues().iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::ScopeDefaulted));
        assert!(codes.contains(&IssueCode::UnitMissing));
        let draft = outcome.draft().unwrap();
        assert_eq!(draft.scope, Scope::Scope3);
        assert_eq!(draft.unit, "");
    }

    #[test]
    fn test_missing_site_uses_default() {
        let mapping = full_mapping();
        let outcome = validate(
            &mapping,
            &["2024-01-15", "", "ELECTRICITY", "SCOPE_2", "10", "kWh"],
        );
        assert_eq!(outcome.draft().unwrap().site_ref, "Unassigned site");
    }

    #[test]
    fn test_unmapped_columns_pass_through_to_notes() {
        let mapping = mapping(&[
            (0, "Activity Type", SemanticRole::ActivityType),
            (1, "Quantity", SemanticRole::Quantity),
            (2, "internal ref", SemanticRole::Unmapped),
        ]);
        let outcome = validate(&mapping, &["GAS", "9", "PO-1234"]);
        assert_eq!(outcome.draft().unwrap().notes, "PO-1234");
    }
}
