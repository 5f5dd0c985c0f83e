use engine_config::ConfigError;
use engine_core::error::RepositoryError;
use engine_processing::error::{ParseError, PipelineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to load inference tables: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("CSV error: {0}")]
    Csv(#[from] ParseError),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
