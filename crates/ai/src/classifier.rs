//! Classifiers scoring encoded rows into a probability of class 1.

use crate::artifact::{ClassifierSchema, NodeSchema, TreeSchema};
use crate::error::LoadError;

/// Validated classifier.
#[derive(Debug, Clone)]
pub enum Classifier {
    Logistic(LogisticRegression),
    Forest(RandomForest),
}

impl Classifier {
    /// Build a classifier for rows of `width` encoded columns.
    pub fn from_schema(schema: ClassifierSchema, width: usize) -> Result<Self, LoadError> {
        match schema {
            ClassifierSchema::Logistic {
                intercept,
                coefficients,
            } => LogisticRegression::new(intercept, coefficients, width).map(Self::Logistic),
            ClassifierSchema::Forest { trees } => RandomForest::new(trees, width).map(Self::Forest),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::Logistic(_) => "logistic",
            Classifier::Forest(_) => "forest",
        }
    }

    /// Probability of class 1 for one encoded row.
    pub fn yes_probability(&self, row: &[f64]) -> f64 {
        match self {
            Classifier::Logistic(m) => m.yes_probability(row),
            Classifier::Forest(m) => m.yes_probability(row),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticRegression {
    fn new(intercept: f64, coefficients: Vec<f64>, width: usize) -> Result<Self, LoadError> {
        if coefficients.len() != width {
            return Err(LoadError::incompatible(format!(
                "logistic classifier has {} coefficients for {width} encoded columns",
                coefficients.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
            return Err(LoadError::incompatible("logistic weights must be finite"));
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    fn yes_probability(&self, row: &[f64]) -> f64 {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        sigmoid(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// Decision tree stored as a node array rooted at index 0.
///
/// Children always sit at higher indices than their parent, so traversal
/// terminates.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn new(schema: TreeSchema, tree: usize, width: usize) -> Result<Self, LoadError> {
        let len = schema.nodes.len();
        if len == 0 {
            return Err(LoadError::incompatible(format!("tree {tree} has no nodes")));
        }

        let nodes = schema
            .nodes
            .into_iter()
            .enumerate()
            .map(|(idx, node)| match node {
                NodeSchema::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= width {
                        return Err(LoadError::incompatible(format!(
                            "tree {tree} node {idx} splits on column {feature} of {width}"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(LoadError::incompatible(format!(
                            "tree {tree} node {idx} has a NaN threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= len {
                            return Err(LoadError::incompatible(format!(
                                "tree {tree} node {idx} has invalid child index {child}"
                            )));
                        }
                    }
                    Ok(Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    })
                }
                NodeSchema::Leaf { yes_probability } => {
                    if !(0.0..=1.0).contains(&yes_probability) {
                        return Err(LoadError::incompatible(format!(
                            "tree {tree} leaf {idx} has probability {yes_probability} outside [0, 1]"
                        )));
                    }
                    Ok(Node::Leaf(yes_probability))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { nodes })
    }

    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
                Node::Leaf(p) => return p,
            }
        }
    }
}

/// Averaging ensemble of probability trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn new(trees: Vec<TreeSchema>, width: usize) -> Result<Self, LoadError> {
        if trees.is_empty() {
            return Err(LoadError::incompatible("forest has no trees"));
        }
        let trees = trees
            .into_iter()
            .enumerate()
            .map(|(idx, tree)| DecisionTree::new(tree, idx, width))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trees })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    fn yes_probability(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.leaf_value(row)).sum();
        total / self.trees.len() as f64
    }
}
