use tracing::{error, info, warn};

use bankmark_core::FeatureTable;

use crate::error::ServingError;
use crate::pipeline::PipelineHandle;
use crate::result::BatchResult;

/// Scores whole tables in one vectorized pipeline call.
#[derive(Debug, Clone)]
pub struct BatchPredictionService {
    handle: PipelineHandle,
}

impl BatchPredictionService {
    pub fn new(handle: PipelineHandle) -> Self {
        Self { handle }
    }

    /// Validate every row, then score the table with a single `predict` and a
    /// single `predict_proba` call.
    ///
    /// All-or-nothing: one invalid row or a pipeline failure fails the call
    /// and no partial results are returned.
    pub fn predict_batch(&self, table: &FeatureTable) -> Result<BatchResult, ServingError> {
        if let Err(e) = table.validate() {
            warn!(rows = table.len(), error = %e, "rejected invalid batch");
            return Err(e.into());
        }

        info!(rows = table.len(), "processing batch prediction");

        let results = self.handle.infer(table).map_err(|source| {
            error!(rows = table.len(), error = %source, "error in batch prediction");
            ServingError::inference(table.len(), source)
        })?;

        let batch = BatchResult::new(results);
        info!(
            rows = batch.len(),
            predicted_yes = batch.predicted_yes(),
            "batch prediction completed"
        );
        Ok(batch)
    }
}
