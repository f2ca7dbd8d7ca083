//! Core business logic
//!
//! The resource transformation pipeline and its batch-level controls:
//!
//! - [`path`] - path-based field access over nested documents
//! - [`spec`] - declarative field tables per resource type
//! - [`validate`] - date and date-time format checks
//! - [`processor`] - the validate/map/normalize pipeline
//! - [`normalize`] - pluggable value normalizers
//! - [`gate`] - the batch quality gate
//! - [`ingest`] - per-file orchestration

pub mod gate;
pub mod ingest;
pub mod normalize;
pub mod path;
pub mod processor;
pub mod spec;
pub mod validate;
