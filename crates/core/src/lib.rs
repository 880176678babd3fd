//! `bankmark-core`: feature schema, records and input validation.
//!
//! This crate holds **pure data** primitives: no model, no I/O.

pub mod error;
pub mod record;
pub mod schema;

pub use error::{FieldIssue, IssueKind, ValidationError, ValidationResult};
pub use record::{FeatureRecord, FeatureTable, FeatureValue};
pub use schema::{FEATURE_SCHEMA, FieldKind, FieldSpec};
