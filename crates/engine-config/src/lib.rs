pub mod error;
pub mod options;
pub mod tables;

pub use error::ConfigError;
pub use options::{ImportOptions, ParseOptions};
pub use tables::{ClassifierWeights, InferenceTables, normalize_key};
