use serde::{Deserialize, Serialize};

use bankmark_ai::{BatchResult, PredictionResult};
use bankmark_core::{FeatureRecord, FeatureTable};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct BatchPredictionRequest {
    pub records: FeatureTable,
}

// -------------------------
// Response DTOs
// -------------------------

/// One input row echoed back with its prediction fields.
#[derive(Debug, Serialize)]
pub struct BatchPredictionRow {
    #[serde(flatten)]
    pub input: FeatureRecord,
    #[serde(flatten)]
    pub result: PredictionResult,
}

#[derive(Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub message: String,
    pub total_samples: usize,
    pub predicted_yes: usize,
    pub predictions: Vec<BatchPredictionRow>,
}

impl BatchPredictionResponse {
    /// Pair each input row with its result; `batch` is in input order.
    pub fn new(input: FeatureTable, batch: BatchResult) -> Self {
        let total_samples = batch.len();
        let predicted_yes = batch.predicted_yes();
        let predictions = input
            .into_rows()
            .into_iter()
            .zip(batch)
            .map(|(input, result)| BatchPredictionRow { input, result })
            .collect();

        Self {
            message: format!("Batch prediction completed for {total_samples} samples"),
            total_samples,
            predicted_yes,
            predictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankmark_ai::format_result;

    #[test]
    fn rows_carry_input_and_result_fields() {
        let input = FeatureTable::new(vec![FeatureRecord::example(), FeatureRecord::example()]);
        let batch = BatchResult::new(vec![
            format_result(1, [0.3, 0.7]),
            format_result(0, [0.82, 0.18]),
        ]);

        let body = serde_json::to_value(BatchPredictionResponse::new(input, batch)).unwrap();
        assert_eq!(body["message"], "Batch prediction completed for 2 samples");
        assert_eq!(body["total_samples"], 2);
        assert_eq!(body["predicted_yes"], 1);

        let first = &body["predictions"][0];
        assert_eq!(first["month"], "may");
        assert_eq!(first["prediction"], 1);
        assert_eq!(first["prediction_label"], "yes");
        assert_eq!(body["predictions"][1]["confidence"], 0.82);
    }
}
