use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use bankmark_core::{FeatureRecord, FeatureTable};

use crate::batch::BatchPredictionService;
use crate::error::{LoadError, ServingError};
use crate::pipeline::{Pipeline, PipelineHandle};
use crate::result::{BatchResult, PredictionResult};
use crate::single::SinglePredictionService;

/// Lifecycle state of the serving component.
///
/// `Unloaded -> Loaded` or `Unloaded -> Failed`; nothing leaves `Failed`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Unloaded,
    Loaded,
    Failed,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceStatus::Unloaded => "unloaded",
            ServiceStatus::Loaded => "loaded",
            ServiceStatus::Failed => "failed",
        })
    }
}

#[derive(Debug)]
enum ServingState {
    Unloaded,
    Loaded {
        single: SinglePredictionService,
        batch: BatchPredictionService,
    },
    Failed {
        reason: String,
    },
}

/// Entry point for callers: gates predictions on the pipeline being loaded.
///
/// Load once during start-up (`&mut self`), then share read-only, e.g. behind
/// an `Arc`. Every predict operation takes `&self`.
#[derive(Debug)]
pub struct PredictionService {
    state: ServingState,
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionService {
    /// A service with no pipeline yet.
    pub fn new() -> Self {
        Self {
            state: ServingState::Unloaded,
        }
    }

    /// A service that is immediately `Loaded` with `handle`.
    pub fn with_handle(handle: PipelineHandle) -> Self {
        Self {
            state: ServingState::Loaded {
                single: SinglePredictionService::new(handle.clone()),
                batch: BatchPredictionService::new(handle),
            },
        }
    }

    pub fn with_pipeline(pipeline: impl Pipeline) -> Self {
        Self::with_handle(PipelineHandle::new(pipeline))
    }

    /// Load the pipeline artifact at `location`.
    ///
    /// Valid only once, from `Unloaded`. A failure moves the service to
    /// `Failed` for good.
    pub fn load(&mut self, location: impl AsRef<Path>) -> Result<(), ServingError> {
        let location = location.as_ref();
        let shown = location.display().to_string();

        match &self.state {
            ServingState::Unloaded => {}
            ServingState::Loaded { .. } => {
                return Err(ServingError::load(shown, LoadError::AlreadyLoaded));
            }
            ServingState::Failed { .. } => {
                return Err(ServingError::load(shown, LoadError::PreviouslyFailed));
            }
        }

        match PipelineHandle::load(location) {
            Ok(handle) => {
                info!(path = %shown, "pipeline loaded successfully");
                *self = Self::with_handle(handle);
                Ok(())
            }
            Err(e) => {
                error!(path = %shown, error = %e, "error loading pipeline");
                self.state = ServingState::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    pub fn status(&self) -> ServiceStatus {
        match self.state {
            ServingState::Unloaded => ServiceStatus::Unloaded,
            ServingState::Loaded { .. } => ServiceStatus::Loaded,
            ServingState::Failed { .. } => ServiceStatus::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == ServiceStatus::Loaded
    }

    /// Message of the load error that put the service in `Failed`.
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            ServingState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult, ServingError> {
        match &self.state {
            ServingState::Loaded { single, .. } => single.predict(record),
            _ => Err(self.unavailable()),
        }
    }

    pub fn predict_batch(&self, table: &FeatureTable) -> Result<BatchResult, ServingError> {
        match &self.state {
            ServingState::Loaded { batch, .. } => batch.predict_batch(table),
            _ => Err(self.unavailable()),
        }
    }

    fn unavailable(&self) -> ServingError {
        ServingError::ServiceUnavailable {
            status: self.status(),
        }
    }
}
