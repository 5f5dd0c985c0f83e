pub mod classifier;
pub mod committer;
pub mod error;
pub mod notation;
pub mod pipeline;
pub mod reader;
pub mod summary;
pub mod validator;
