use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bankmark_core::FeatureTable;

use crate::artifact::ArtifactPipeline;
use crate::error::{PipelineError, ServingError};
use crate::result::{PredictionResult, format_result};

/// Class index produced by the classifier (`0` = no, `1` = yes).
pub type ClassIndex = u8;

/// Probability vector ordered `[class 0, class 1]`.
pub type ClassProbabilities = [f64; 2];

/// A trained feature-transform + classifier, seen as an opaque capability.
///
/// Implementations must be pure and safe to call from many threads at once.
/// They do not validate the schema: callers hand them validated tables.
pub trait Pipeline: Send + Sync + 'static {
    /// One class index per row, in row order.
    fn predict(&self, table: &FeatureTable) -> Result<Vec<ClassIndex>, PipelineError>;

    /// One probability vector per row, in row order.
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<ClassProbabilities>, PipelineError>;
}

/// Shared, read-only handle to the loaded pipeline.
///
/// Created once at start-up and cloned into every request path.
#[derive(Clone)]
pub struct PipelineHandle {
    pipeline: Arc<dyn Pipeline>,
}

impl PipelineHandle {
    pub fn new(pipeline: impl Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_arc(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Deserialize a persisted pipeline artifact.
    pub fn load(location: impl AsRef<Path>) -> Result<Self, ServingError> {
        let location = location.as_ref();
        let pipeline = ArtifactPipeline::from_path(location)
            .map_err(|e| ServingError::load(location.display().to_string(), e))?;
        Ok(Self::new(pipeline))
    }

    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<ClassIndex>, PipelineError> {
        self.pipeline.predict(table)
    }

    pub fn predict_proba(
        &self,
        table: &FeatureTable,
    ) -> Result<Vec<ClassProbabilities>, PipelineError> {
        self.pipeline.predict_proba(table)
    }

    /// Score a whole table with one `predict` and one `predict_proba` call.
    ///
    /// Shared by the single and batch services. The pipeline's output is
    /// checked against its contract before formatting.
    pub(crate) fn infer(&self, table: &FeatureTable) -> Result<Vec<PredictionResult>, PipelineError> {
        let classes = self.predict(table)?;
        let probabilities = self.predict_proba(table)?;

        if classes.len() != table.len() || probabilities.len() != table.len() {
            return Err(PipelineError::Contract(format!(
                "expected {} output(s), got {} class index(es) and {} probability vector(s)",
                table.len(),
                classes.len(),
                probabilities.len()
            )));
        }

        classes
            .into_iter()
            .zip(probabilities)
            .enumerate()
            .map(|(row, (class, proba))| {
                check_output(row, class, proba)?;
                Ok(format_result(class, proba))
            })
            .collect()
    }
}

impl fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineHandle").finish_non_exhaustive()
    }
}

fn check_output(row: usize, class: ClassIndex, proba: ClassProbabilities) -> Result<(), PipelineError> {
    if class > 1 {
        return Err(PipelineError::Contract(format!(
            "row {row}: class index {class} is not 0 or 1"
        )));
    }
    let [no, yes] = proba;
    let in_unit = |p: f64| (0.0..=1.0).contains(&p);
    if !in_unit(no) || !in_unit(yes) || (no + yes - 1.0).abs() > 1e-6 {
        return Err(PipelineError::Contract(format!(
            "row {row}: [{no}, {yes}] is not a probability distribution"
        )));
    }
    Ok(())
}
