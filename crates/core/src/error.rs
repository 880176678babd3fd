//! Input validation error model.

use thiserror::Error;

/// Result type used by schema validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Why a single field was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IssueKind {
    #[error("required field is missing")]
    Missing,

    #[error("field is not part of the schema")]
    Unexpected,

    #[error("expected an integer")]
    ExpectedInteger,

    #[error("expected a number")]
    ExpectedNumber,

    #[error("expected a string")]
    ExpectedCategory,

    #[error("value must be finite")]
    NotFinite,

    #[error("value {value} is below the minimum of {min}")]
    BelowMinimum { value: i64, min: i64 },

    #[error("unknown category {value:?} (allowed: {})", .allowed.join(", "))]
    UnknownCategory {
        value: String,
        allowed: &'static [&'static str],
    },
}

/// A rejected field together with the reason.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{field}: {kind}")]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// Input that does not satisfy the fixed feature schema.
///
/// Recoverable: the caller has to fix the input. Raised before any pipeline
/// invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A batch request carried zero rows.
    #[error("feature table is empty")]
    EmptyTable,

    /// A single record failed validation.
    #[error("invalid record: {}", describe(.0))]
    Record(Vec<FieldIssue>),

    /// A row of a batch failed validation (0-based row index).
    #[error("invalid row {row}: {}", describe(.issues))]
    Row { row: usize, issues: Vec<FieldIssue> },
}

impl ValidationError {
    /// Field-level issues carried by this error (empty for `EmptyTable`).
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ValidationError::EmptyTable => &[],
            ValidationError::Record(issues) => issues,
            ValidationError::Row { issues, .. } => issues,
        }
    }

    /// Names of the offending fields, in schema order followed by unknown fields.
    pub fn offending_fields(&self) -> Vec<&str> {
        self.issues().iter().map(|i| i.field.as_str()).collect()
    }

    /// Re-tag a record error with the row it came from.
    pub fn at_row(self, row: usize) -> Self {
        match self {
            ValidationError::Record(issues) => ValidationError::Row { row, issues },
            other => other,
        }
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
