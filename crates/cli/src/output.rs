use crate::error::CliError;
use engine_processing::pipeline::ParseReport;
use model::mapping::ColumnMapping;
use model::result::ImportResult;

pub async fn write_report(report: &ParseReport, path: String) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub fn print_report_json(report: &ParseReport) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_mapping(mapping: &ColumnMapping) {
    println!("Detected columns:");
    println!("-----------------------------");
    for column in &mapping.columns {
        println!("{:<4} {:<28} {}", column.index, column.header, column.role);
    }
    if !mapping.is_usable() {
        let missing: Vec<String> = mapping
            .missing_roles()
            .iter()
            .map(|r| r.to_string())
            .collect();
        println!();
        println!("Schema unusable, missing: {}", missing.join(", "));
    }
}

pub fn print_report(report: &ParseReport) {
    print_mapping(&report.mapping);

    let summary = &report.summary;
    println!();
    println!("Parse summary:");
    println!("-----------------------------");
    println!("{:<16} {}", "Total rows", summary.total_rows);
    println!("{:<16} {}", "Valid", summary.valid_rows);
    println!("{:<16} {}", "With warnings", summary.warning_rows);
    println!("{:<16} {}", "Errors", summary.error_rows);
    if let Some((min, max)) = summary.year_range {
        println!("{:<16} {min}-{max}", "Years");
    }

    if !summary.counts_by_activity_type.is_empty() {
        println!();
        println!("Rows by activity type:");
        for (activity_type, count) in &summary.counts_by_activity_type {
            println!("{count:>6}  {activity_type}");
        }
    }
    if !summary.counts_by_scope.is_empty() {
        println!();
        println!("Rows by scope:");
        for (scope, count) in &summary.counts_by_scope {
            println!("{count:>6}  {scope}");
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("First error rows:");
        for error in &report.errors {
            for issue in &error.issues {
                let value = issue.value.as_deref().unwrap_or("");
                println!("row {:<6} {:<24} {value}", error.row, issue.code.as_str());
            }
        }
    }
}

pub fn print_import_result(result: &ImportResult) {
    println!("Import result:");
    println!("-----------------------------");
    println!("{:<16} {}", "Parsed", result.total_parsed);
    println!("{:<16} {}", "Imported", result.total_imported);
    println!("{:<16} {}", "Duplicates", result.total_duplicates);
    println!("{:<16} {}", "Skipped", result.total_skipped);
    println!("{:<16} {}", "Failed", result.total_failed);
    println!("{:<16} {}", "New sites", result.created_site_ids.len());
    println!("{:<16} {}", "New periods", result.created_period_ids.len());

    if !result.skip_reasons.is_empty() {
        println!();
        println!("Skipped drafts:");
        for issue in &result.skip_reasons {
            let value = issue.value.as_deref().unwrap_or("");
            println!("{:<24} {value}", issue.code.as_str());
        }
    }
}
