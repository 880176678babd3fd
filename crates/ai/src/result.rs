use serde::{Deserialize, Serialize};

use crate::pipeline::{ClassIndex, ClassProbabilities};

/// Human-readable class label.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionLabel {
    No,
    Yes,
}

impl PredictionLabel {
    pub fn from_class(class: ClassIndex) -> Self {
        if class == 1 { Self::Yes } else { Self::No }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLabel::No => "no",
            PredictionLabel::Yes => "yes",
        }
    }
}

/// Outcome of scoring one record.
///
/// Invariants (guaranteed by [`format_result`]):
/// - `probability_no + probability_yes == 1` within floating-point tolerance
/// - `confidence == max(probability_no, probability_yes)`
/// - `prediction_label == Yes` exactly when `prediction == 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: ClassIndex,
    pub prediction_label: PredictionLabel,
    pub probability_no: f64,
    pub probability_yes: f64,
    pub confidence: f64,
}

impl PredictionResult {
    pub fn is_yes(&self) -> bool {
        self.prediction == 1
    }
}

/// Map raw pipeline output to the external result contract.
///
/// `probabilities` is ordered `[class 0, class 1]`. Inputs come from a
/// contract-checked pipeline call, so malformed values are a programming error.
pub fn format_result(class: ClassIndex, probabilities: ClassProbabilities) -> PredictionResult {
    debug_assert!(class <= 1, "class index out of range: {class}");
    let [probability_no, probability_yes] = probabilities;

    PredictionResult {
        prediction: class,
        prediction_label: PredictionLabel::from_class(class),
        probability_no,
        probability_yes,
        confidence: probability_no.max(probability_yes),
    }
}

/// Results of a batch call: one entry per input row, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult {
    results: Vec<PredictionResult>,
}

impl BatchResult {
    pub fn new(results: Vec<PredictionResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[PredictionResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PredictionResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredictionResult> {
        self.results.iter()
    }

    /// Number of rows predicted to subscribe.
    pub fn predicted_yes(&self) -> usize {
        self.results.iter().filter(|r| r.is_yes()).count()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a PredictionResult;
    type IntoIter = std::slice::Iter<'a, PredictionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for BatchResult {
    type Item = PredictionResult;
    type IntoIter = std::vec::IntoIter<PredictionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_positive_prediction() {
        let r = format_result(1, [0.3, 0.7]);
        assert_eq!(
            r,
            PredictionResult {
                prediction: 1,
                prediction_label: PredictionLabel::Yes,
                probability_no: 0.3,
                probability_yes: 0.7,
                confidence: 0.7,
            }
        );
    }

    #[test]
    fn formats_negative_prediction() {
        let r = format_result(0, [0.82, 0.18]);
        assert_eq!(r.prediction_label, PredictionLabel::No);
        assert_eq!(r.confidence, 0.82);
        assert!(!r.is_yes());
    }

    #[test]
    fn serializes_to_result_contract() {
        let json = serde_json::to_value(format_result(1, [0.25, 0.75])).unwrap();
        assert_eq!(
            json,
            json!({
                "prediction": 1,
                "prediction_label": "yes",
                "probability_no": 0.25,
                "probability_yes": 0.75,
                "confidence": 0.75
            })
        );
    }

    #[test]
    fn batch_counts_yes_predictions() {
        let batch = BatchResult::new(vec![
            format_result(1, [0.1, 0.9]),
            format_result(0, [0.6, 0.4]),
            format_result(1, [0.45, 0.55]),
        ]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.predicted_yes(), 2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: formatted results satisfy the contract invariants.
            #[test]
            fn invariants_hold(p_yes in 0.0f64..=1.0) {
                let class = if p_yes > 0.5 { 1 } else { 0 };
                let r = format_result(class, [1.0 - p_yes, p_yes]);

                prop_assert!((r.probability_no + r.probability_yes - 1.0).abs() < 1e-6);
                prop_assert_eq!(r.confidence, r.probability_no.max(r.probability_yes));
                prop_assert_eq!(r.prediction_label == PredictionLabel::Yes, r.prediction == 1);
                prop_assert_eq!(r.prediction_label.as_str(), if class == 1 { "yes" } else { "no" });
            }
        }
    }
}
