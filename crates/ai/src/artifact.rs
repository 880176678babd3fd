//! Persisted pipeline artifacts.
//!
//! Schema types mirror the JSON document and are kept separate from the
//! runtime types in [`transform`](crate::transform) and
//! [`classifier`](crate::classifier): conversion validates everything once at
//! load time so inference never has to.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use bankmark_core::FeatureTable;

use crate::classifier::Classifier;
use crate::error::{LoadError, PipelineError};
use crate::pipeline::{ClassIndex, ClassProbabilities, Pipeline};
use crate::transform::FeatureTransform;

/// Artifact format understood by this reader.
pub const FORMAT_VERSION: u32 = 1;

/// Top-level artifact document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    /// Class labels in probability-vector order. Must be `[0, 1]`.
    pub classes: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub transform: TransformSchema,
    pub classifier: ClassifierSchema,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformSchema {
    #[serde(default)]
    pub numeric: Vec<NumericColumnSchema>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumnSchema>,
}

/// Standardised numeric column: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumnSchema {
    pub field: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// One-hot encoded column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumnSchema {
    pub field: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub handle_unknown: UnknownCategoryPolicy,
}

/// What the encoder does with a category missing from its vocabulary.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Fail the inference call.
    #[default]
    Error,
    /// Encode as all zeros.
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSchema {
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    Forest {
        trees: Vec<TreeSchema>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    pub nodes: Vec<NodeSchema>,
}

/// Tree node. Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSchema {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        yes_probability: f64,
    },
}

/// Pipeline backed by a loaded artifact.
#[derive(Debug, Clone)]
pub struct ArtifactPipeline {
    name: Option<String>,
    transform: FeatureTransform,
    classifier: Classifier,
}

impl ArtifactPipeline {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let artifact: PipelineArtifact = serde_json::from_reader(reader)?;
        Self::try_from(artifact)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn transform(&self) -> &FeatureTransform {
        &self.transform
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Encode the whole table once, then score every row.
    fn yes_probabilities(&self, table: &FeatureTable) -> Result<Vec<f64>, PipelineError> {
        let matrix = self.transform.transform(table)?;
        Ok(matrix
            .chunks_exact(self.transform.width())
            .map(|row| self.classifier.yes_probability(row))
            .collect())
    }
}

impl TryFrom<PipelineArtifact> for ArtifactPipeline {
    type Error = LoadError;

    fn try_from(artifact: PipelineArtifact) -> Result<Self, Self::Error> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(LoadError::incompatible(format!(
                "format version {} is not supported (expected {FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        if artifact.classes != [0, 1] {
            return Err(LoadError::incompatible(format!(
                "expected binary classes [0, 1], found {:?}",
                artifact.classes
            )));
        }

        let transform = FeatureTransform::try_from(artifact.transform)?;
        let classifier = Classifier::from_schema(artifact.classifier, transform.width())?;

        Ok(Self {
            name: artifact.name,
            transform,
            classifier,
        })
    }
}

impl Pipeline for ArtifactPipeline {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<ClassIndex>, PipelineError> {
        // argmax over [1 - p, p]; ties go to class 0
        Ok(self
            .yes_probabilities(table)?
            .into_iter()
            .map(|p| ClassIndex::from(p > 0.5))
            .collect())
    }

    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<ClassProbabilities>, PipelineError> {
        Ok(self
            .yes_probabilities(table)?
            .into_iter()
            .map(|p| [1.0 - p, p])
            .collect())
    }
}
