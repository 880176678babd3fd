//! `bankmark-ai`
//!
//! **Responsibility:** inference serving for the marketing-response model.
//!
//! - [`PipelineHandle`] owns the trained pipeline (transform + classifier) as
//!   a shared, immutable capability.
//! - [`SinglePredictionService`] and [`BatchPredictionService`] validate input
//!   and invoke the pipeline; batches go through one vectorized call.
//! - [`format_result`] maps raw output to the [`PredictionResult`] contract.
//! - [`PredictionService`] gates everything on the pipeline being loaded.

pub mod artifact;
pub mod batch;
pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod result;
pub mod service;
pub mod single;
pub mod transform;

pub use artifact::{ArtifactPipeline, PipelineArtifact, UnknownCategoryPolicy};
pub use batch::BatchPredictionService;
pub use error::{LoadError, PipelineError, ServingError};
pub use pipeline::{ClassIndex, ClassProbabilities, Pipeline, PipelineHandle};
pub use result::{BatchResult, PredictionLabel, PredictionResult, format_result};
pub use service::{PredictionService, ServiceStatus};
pub use single::SinglePredictionService;
