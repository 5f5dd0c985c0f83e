use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read the inference-table file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse the inference-table file as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid inference table: {0}")]
    InvalidTable(String),
}
