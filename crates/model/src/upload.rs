use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle stage of one uploaded file.
///
/// Stages only move forward; a handle that needs re-parsing is replaced by a
/// new upload, never rewound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    Uploaded,
    Parsed,
    Imported,
    Complete,
    Failed,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Uploaded => "uploaded",
            UploadStage::Parsed => "parsed",
            UploadStage::Imported => "imported",
            UploadStage::Complete => "complete",
            UploadStage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Identity of one intake file. Created once at intake; only the stage
/// mutates afterwards, and only through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadHandle {
    pub id: Uuid,
    pub original_filename: String,
    /// Opaque customer scope tag recorded at intake; the pipeline never
    /// interprets it.
    pub customer_ref: Option<String>,
    pub byte_size: usize,
    pub received_at: DateTime<Utc>,
    pub stage: UploadStage,
}

impl UploadHandle {
    pub fn new(original_filename: &str, byte_size: usize, customer_ref: Option<&str>) -> Self {
        UploadHandle {
            id: Uuid::new_v4(),
            original_filename: original_filename.to_string(),
            customer_ref: customer_ref.map(str::to_string),
            byte_size,
            received_at: Utc::now(),
            stage: UploadStage::Uploaded,
        }
    }
}
