use engine_core::error::ImportError;
use model::upload::UploadStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pipeline-level failures: fatal to the current stage, unlike row-level
/// issues which are returned as data.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage `{from}` does not accept `{event}`; create a new upload to retry")]
    InvalidStageTransition {
        from: UploadStage,
        event: &'static str,
    },

    #[error("Unusable schema: {0}")]
    UnusableSchema(String),

    #[error("Parse state is not held in memory; re-parse this upload before importing")]
    ParseStateMissing,

    #[error("Parse produced zero valid rows, nothing to import")]
    NoValidRows,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Import(#[from] ImportError),
}
