pub mod activity;
pub mod entities;
pub mod issue;
pub mod mapping;
pub mod notation;
pub mod outcome;
pub mod result;
pub mod summary;
pub mod upload;
