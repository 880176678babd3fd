use tracing::{error, warn};

use bankmark_core::{FeatureRecord, FeatureTable};

use crate::error::{PipelineError, ServingError};
use crate::pipeline::PipelineHandle;
use crate::result::PredictionResult;

/// Scores one record at a time.
#[derive(Debug, Clone)]
pub struct SinglePredictionService {
    handle: PipelineHandle,
}

impl SinglePredictionService {
    pub fn new(handle: PipelineHandle) -> Self {
        Self { handle }
    }

    /// Validate `record`, wrap it as a one-row table and score it.
    ///
    /// Invalid records never reach the pipeline.
    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult, ServingError> {
        if let Err(e) = record.validate() {
            warn!(error = %e, "rejected invalid record");
            return Err(e.into());
        }

        let table = FeatureTable::single(record.clone());
        let results = self.handle.infer(&table).map_err(|source| {
            error!(error = %source, "error making prediction");
            ServingError::inference(1, source)
        })?;

        results.into_iter().next().ok_or_else(|| {
            ServingError::inference(1, PipelineError::Contract("no output for the record".into()))
        })
    }
}
