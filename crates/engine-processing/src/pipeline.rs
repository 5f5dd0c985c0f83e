use crate::classifier::ColumnClassifier;
use crate::committer::ImportCommitter;
use crate::error::PipelineError;
use crate::reader::CsvRowReader;
use crate::summary::AggregationSummarizer;
use crate::validator::RowValidator;
use engine_config::{ImportOptions, InferenceTables, ParseOptions};
use engine_core::repository::ActivityRepository;
use model::activity::ActivityDraft;
use model::issue::Issue;
use model::mapping::ColumnMapping;
use model::result::ImportResult;
use model::summary::ParseSummary;
use model::upload::{UploadHandle, UploadStage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Valid-draft preview rows returned after a parse.
const PREVIEW_VALID_ROWS: usize = 5;
/// Error rows returned after a parse.
const PREVIEW_ERROR_ROWS: usize = 10;

/// One row that failed validation, with its 1-based row index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowErrorReport {
    pub row: usize,
    pub issues: Vec<Issue>,
}

/// Bounded response for one parse pass: the summary, the detected mapping,
/// a small draft preview and the first few error rows. The full draft set
/// stays on the pipeline for the import step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseReport {
    pub summary: ParseSummary,
    pub mapping: ColumnMapping,
    pub preview: Vec<ActivityDraft>,
    pub errors: Vec<RowErrorReport>,
}

#[derive(Debug)]
struct ParsedState {
    summary: ParseSummary,
    drafts: Vec<ActivityDraft>,
}

/// Per-upload orchestration of the Upload → Parse → Import → Complete
/// lifecycle. All state lives on the instance; distinct uploads never share
/// anything mutable, so they can run concurrently.
///
/// Stages only move forward. Re-invoking a passed stage is rejected with
/// `InvalidStageTransition`; redoing a parse means creating a new upload.
pub struct IngestionPipeline {
    handle: UploadHandle,
    bytes: Vec<u8>,
    tables: Arc<InferenceTables>,
    parsed: Option<ParsedState>,
}

impl IngestionPipeline {
    /// Intake: creates the upload handle for a fresh byte payload. The
    /// customer scope is an opaque tag carried on the handle.
    pub fn new(
        bytes: Vec<u8>,
        filename: &str,
        customer_ref: Option<&str>,
        tables: Arc<InferenceTables>,
    ) -> Self {
        let handle = UploadHandle::new(filename, bytes.len(), customer_ref);
        info!(
            upload = %handle.id,
            filename,
            customer = customer_ref.unwrap_or(""),
            bytes = bytes.len(),
            "Upload received"
        );
        IngestionPipeline {
            handle,
            bytes,
            tables,
            parsed: None,
        }
    }

    /// Rebuilds a pipeline for an existing handle (e.g. after a process
    /// restart between parse and import). The stage carried by the handle
    /// still governs which events are legal.
    pub fn resume(handle: UploadHandle, bytes: Vec<u8>, tables: Arc<InferenceTables>) -> Self {
        IngestionPipeline {
            handle,
            bytes,
            tables,
            parsed: None,
        }
    }

    pub fn handle(&self) -> &UploadHandle {
        &self.handle
    }

    pub fn stage(&self) -> UploadStage {
        self.handle.stage
    }

    /// Number of importable drafts held after a successful parse.
    pub fn draft_count(&self) -> usize {
        self.parsed.as_ref().map(|p| p.drafts.len()).unwrap_or(0)
    }

    pub fn parse(&mut self, options: &ParseOptions) -> Result<ParseReport, PipelineError> {
        self.guard(UploadStage::Uploaded, "parse")?;

        let reader = CsvRowReader::new(std::mem::take(&mut self.bytes), options);
        let report = match self.run_parse(&reader, options) {
            Ok(report) => report,
            Err(e) => {
                // Unusable schema or an unreadable file is fatal to the
                // upload, not to a row.
                warn!(upload = %self.handle.id, error = %e, "Parse failed");
                self.handle.stage = UploadStage::Failed;
                return Err(e);
            }
        };
        self.handle.stage = UploadStage::Parsed;
        info!(
            upload = %self.handle.id,
            total = report.summary.total_rows,
            valid = report.summary.valid_rows,
            errors = report.summary.error_rows,
            "Parse complete"
        );
        Ok(report)
    }

    fn run_parse(
        &mut self,
        reader: &CsvRowReader,
        options: &ParseOptions,
    ) -> Result<ParseReport, PipelineError> {
        let headers = reader.headers()?;
        let sample = reader.sample(self.tables.weights.sample_cap)?;
        let mapping = ColumnClassifier::new(&self.tables).classify(&headers, &sample);

        if !mapping.is_usable() {
            let missing: Vec<String> = mapping
                .missing_roles()
                .iter()
                .map(|r| r.to_string())
                .collect();
            return Err(PipelineError::UnusableSchema(format!(
                "no column qualified for mandatory role(s): {}",
                missing.join(", ")
            )));
        }

        let validator = RowValidator::new(&mapping, &self.tables, options);
        let mut summarizer = AggregationSummarizer::new();
        let mut drafts = Vec::new();
        let mut preview = Vec::new();
        let mut errors = Vec::new();

        for row in reader.rows()? {
            let row = row?;
            let index = row.index;
            let outcome = validator.validate(&row);
            summarizer.add(&outcome);

            if outcome.is_valid() {
                if let Some(draft) = outcome.into_draft() {
                    if preview.len() < PREVIEW_VALID_ROWS {
                        preview.push(draft.clone());
                    }
                    drafts.push(draft);
                }
            } else if errors.len() < PREVIEW_ERROR_ROWS {
                errors.push(RowErrorReport {
                    row: index,
                    issues: outcome.issues().to_vec(),
                });
            }
        }

        let summary = summarizer.finish();
        self.parsed = Some(ParsedState {
            summary: summary.clone(),
            drafts,
        });
        Ok(ParseReport {
            summary,
            mapping,
            preview,
            errors,
        })
    }

    /// Commits the retained valid drafts. Commit-level errors
    /// (`NoPeriodSelected`, `PartialCommitFailure`) leave the stage at
    /// `Parsed` so the caller can retry with corrected options.
    pub async fn import(
        &mut self,
        repo: Arc<dyn ActivityRepository>,
        options: ImportOptions,
    ) -> Result<ImportResult, PipelineError> {
        self.guard(UploadStage::Parsed, "import")?;

        // A resumed handle can sit at Parsed without the drafts in memory.
        let Some(parsed) = self.parsed.as_ref() else {
            return Err(PipelineError::ParseStateMissing);
        };
        if parsed.summary.valid_rows == 0 {
            warn!(upload = %self.handle.id, "No valid rows to import");
            self.handle.stage = UploadStage::Failed;
            return Err(PipelineError::NoValidRows);
        }

        let committer = ImportCommitter::new(repo, options);
        let result = committer.commit(self.handle.id, &parsed.drafts).await?;
        self.handle.stage = UploadStage::Imported;
        Ok(result)
    }

    pub fn finalize(&mut self) -> Result<(), PipelineError> {
        self.guard(UploadStage::Imported, "finalize")?;
        self.handle.stage = UploadStage::Complete;
        info!(upload = %self.handle.id, "Upload complete");
        Ok(())
    }

    fn guard(&self, expected: UploadStage, event: &'static str) -> Result<(), PipelineError> {
        if self.handle.stage != expected {
            return Err(PipelineError::InvalidStageTransition {
                from: self.handle.stage,
                event,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::repository::memory::InMemoryRepository;

    const CLEAN_CSV: &str = "\
Date,Site,Activity Type,Scope,Quantity,Unit
2024-01-15,Main Office,ELECTRICITY,SCOPE_2,1500,kWh
2024-02-10,Main Office,NATURAL GAS,SCOPE_1,800,kWh
";

    fn pipeline(content: &str) -> IngestionPipeline {
        IngestionPipeline::new(
            content.as_bytes().to_vec(),
            "export.csv",
            None,
            Arc::new(InferenceTables::default()),
        )
    }

    #[test]
    fn test_parse_moves_to_parsed() {
        let mut p = pipeline(CLEAN_CSV);
        assert_eq!(p.stage(), UploadStage::Uploaded);

        let report = p.parse(&ParseOptions::default()).unwrap();
        assert_eq!(p.stage(), UploadStage::Parsed);
        assert_eq!(report.summary.total_rows, 2);
        assert_eq!(report.summary.valid_rows, 2);
        assert_eq!(report.preview.len(), 2);
    }

    #[test]
    fn test_upload_carries_customer_scope() {
        let p = IngestionPipeline::new(
            CLEAN_CSV.as_bytes().to_vec(),
            "export.csv",
            Some("acme-industries"),
            Arc::new(InferenceTables::default()),
        );
        assert_eq!(p.handle().customer_ref.as_deref(), Some("acme-industries"));
    }

    #[test]
    fn test_report_previews_are_bounded() {
        let mut csv = String::from("Date,Site,Activity Type,Scope,Quantity,Unit\n");
        for day in 1..=8 {
            csv.push_str(&format!(
                "2024-01-{day:02},Main,ELECTRICITY,SCOPE_2,{},kWh\n",
                100 * day
            ));
        }
        for _ in 0..12 {
            csv.push_str("2024-01-20,Main,ELECTRICITY,SCOPE_2,garbled,kWh\n");
        }

        let mut p = pipeline(&csv);
        let report = p.parse(&ParseOptions::default()).unwrap();

        // The summary counts everything; the report stays bounded.
        assert_eq!(report.summary.total_rows, 20);
        assert_eq!(report.summary.valid_rows, 8);
        assert_eq!(report.summary.error_rows, 12);
        assert_eq!(report.preview.len(), PREVIEW_VALID_ROWS);
        assert_eq!(report.errors.len(), PREVIEW_ERROR_ROWS);
        assert_eq!(p.draft_count(), 8, "all drafts retained for import");
    }

    #[test]
    fn test_parse_twice_is_rejected() {
        let mut p = pipeline(CLEAN_CSV);
        p.parse(&ParseOptions::default()).unwrap();

        let err = p.parse(&ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidStageTransition {
                from: UploadStage::Parsed,
                event: "parse"
            }
        ));
    }

    #[test]
    fn test_unusable_schema_fails_upload() {
        let mut p = pipeline("a,b\nx,y\n");
        let err = p.parse(&ParseOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnusableSchema(_)));
        assert_eq!(p.stage(), UploadStage::Failed);
    }

    #[tokio::test]
    async fn test_import_before_parse_is_rejected() {
        let mut p = pipeline(CLEAN_CSV);
        let repo = Arc::new(InMemoryRepository::new());
        let err = p
            .import(repo, ImportOptions::auto_create())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidStageTransition { event: "import", .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_valid_rows_fails_import() {
        let mut p = pipeline(
            "Activity Type,Quantity\nELECTRICITY,abc\nGAS,also bad\n",
        );
        let report = p.parse(&ParseOptions::default()).unwrap();
        assert_eq!(report.summary.valid_rows, 0);

        let repo = Arc::new(InMemoryRepository::new());
        let err = p
            .import(repo, ImportOptions::auto_create())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoValidRows));
        assert_eq!(p.stage(), UploadStage::Failed);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mut p = pipeline(CLEAN_CSV);
        p.parse(&ParseOptions::default()).unwrap();

        let repo = Arc::new(InMemoryRepository::new());
        let result = p
            .import(repo.clone(), ImportOptions::auto_create())
            .await
            .unwrap();
        assert_eq!(p.stage(), UploadStage::Imported);
        assert_eq!(result.total_imported, 2);

        p.finalize().unwrap();
        assert_eq!(p.stage(), UploadStage::Complete);

        let err = p.finalize().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidStageTransition { event: "finalize", .. }
        ));
    }

    #[tokio::test]
    async fn test_resumed_parsed_handle_requires_reparse() {
        let mut p = pipeline(CLEAN_CSV);
        p.parse(&ParseOptions::default()).unwrap();

        // The drafts live only in the original instance.
        let mut resumed = IngestionPipeline::resume(
            p.handle().clone(),
            CLEAN_CSV.as_bytes().to_vec(),
            Arc::new(InferenceTables::default()),
        );
        let repo = Arc::new(InMemoryRepository::new());
        let err = resumed
            .import(repo, ImportOptions::auto_create())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ParseStateMissing));
        assert_eq!(resumed.stage(), UploadStage::Parsed);
    }

    #[tokio::test]
    async fn test_commit_error_keeps_stage_parsed() {
        let mut p = pipeline(CLEAN_CSV);
        p.parse(&ParseOptions::default()).unwrap();

        let repo = Arc::new(InMemoryRepository::new());
        let err = p
            .import(repo.clone(), ImportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Import(engine_core::error::ImportError::NoPeriodSelected)
        ));
        assert_eq!(p.stage(), UploadStage::Parsed);

        // Retry with corrected options succeeds.
        let result = p
            .import(repo, ImportOptions::auto_create())
            .await
            .unwrap();
        assert_eq!(result.total_imported, 2);
        assert_eq!(p.stage(), UploadStage::Imported);
    }
}
