use thiserror::Error;

use bankmark_core::ValidationError;

use crate::service::ServiceStatus;

/// Failure raised by a [`Pipeline`](crate::Pipeline) implementation while
/// transforming or scoring a table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("row {row}: column {column} is missing")]
    MissingColumn { row: usize, column: String },

    #[error("row {row}: column {column} has a value the transform cannot use")]
    ColumnType { row: usize, column: String },

    #[error("row {row}: column {column} has category {value:?} unknown to the encoder")]
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },

    /// The pipeline produced output that breaks the predict/predict_proba contract.
    #[error("pipeline output violates its contract: {0}")]
    Contract(String),

    #[error("{0}")]
    Failed(String),
}

/// Why a pipeline artifact could not be turned into a pipeline.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact is not a valid pipeline document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("artifact is incompatible: {0}")]
    Incompatible(String),

    #[error("a pipeline is already loaded")]
    AlreadyLoaded,

    #[error("an earlier load failed; restart the process to retry")]
    PreviouslyFailed,
}

impl LoadError {
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::Incompatible(msg.into())
    }
}

/// Errors surfaced by the prediction services.
///
/// Every failure path of the serving core ends in exactly one of these kinds.
#[derive(Debug, Error)]
pub enum ServingError {
    /// Input does not satisfy the feature schema; the pipeline was not invoked.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The pipeline artifact could not be loaded. Fatal at start-up.
    #[error("failed to load pipeline from {location}: {source}")]
    PipelineLoad {
        location: String,
        #[source]
        source: LoadError,
    },

    /// A predict call arrived while no pipeline is loaded.
    #[error("prediction service unavailable (pipeline {status})")]
    ServiceUnavailable { status: ServiceStatus },

    /// The loaded pipeline failed on well-formed input.
    #[error("pipeline inference failed on {rows} row(s): {source}")]
    PipelineInference {
        rows: usize,
        #[source]
        source: PipelineError,
    },
}

impl ServingError {
    pub fn load(location: impl Into<String>, source: LoadError) -> Self {
        Self::PipelineLoad {
            location: location.into(),
            source,
        }
    }

    pub fn inference(rows: usize, source: PipelineError) -> Self {
        Self::PipelineInference { rows, source }
    }

    /// Stable machine-readable code for each error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ServingError::Validation(_) => "validation_error",
            ServingError::PipelineLoad { .. } => "pipeline_load_error",
            ServingError::ServiceUnavailable { .. } => "service_unavailable",
            ServingError::PipelineInference { .. } => "inference_error",
        }
    }
}
