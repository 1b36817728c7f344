use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::{
    check_input_width, read_json, read_json_path, ArtifactKind, ArtifactLoadError, InferenceError,
    Predict,
};
use crate::prediction::features::FEATURE_COUNT;

/// Child index marking a leaf node in the exported tree arrays.
const LEAF: i64 = -1;

const DEFAULT_CLASSES: [i64; 2] = [0, 1];

fn default_classes() -> Vec<i64> {
    DEFAULT_CLASSES.to_vec()
}

/// Trained classifier exported as JSON.
///
/// `from_path` and `from_reader` reject structurally broken artifacts up front.
/// Values built any other way are still checked during `predict`, which reports
/// [`InferenceError`] instead of indexing past the exported arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactLoadError> {
        let artifact: Self = read_json_path(ArtifactKind::Model, path.as_ref())?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactLoadError> {
        let artifact: Self = read_json(ArtifactKind::Model, reader, "reader")?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub const fn family(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    fn validate(&self) -> Result<(), ArtifactLoadError> {
        let result = match self {
            ModelArtifact::LogisticRegression(model) => model.validate(),
            ModelArtifact::DecisionTree(tree) => validate_classes(tree.classes())
                .and_then(|_| tree.validate(tree.classes().len())),
            ModelArtifact::RandomForest(forest) => forest.validate(),
        };
        result.map_err(|detail| ArtifactLoadError::invalid(ArtifactKind::Model, detail))
    }
}

impl Predict for ModelArtifact {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        check_input_width(FEATURE_COUNT, features)?;

        match self {
            ModelArtifact::LogisticRegression(model) => model.label(features),
            ModelArtifact::DecisionTree(tree) => {
                let weights = tree.leaf_value(features)?;
                class_at(tree.classes(), argmax(weights))
            }
            ModelArtifact::RandomForest(forest) => forest.label(features),
        }
    }
}

fn validate_classes(classes: &[i64]) -> Result<(), String> {
    if classes.len() < 2 {
        return Err(format!(
            "classifier needs at least two classes, found {}",
            classes.len()
        ));
    }
    Ok(())
}

fn class_at(classes: &[i64], index: usize) -> Result<i64, InferenceError> {
    classes.get(index).copied().ok_or_else(|| {
        InferenceError::malformed(format!(
            "no class for output {index}, model declares {}",
            classes.len()
        ))
    })
}

/// Index of the largest entry; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

/// Binary linear classifier: positive class when `w·x + b > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
}

impl LogisticRegression {
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept
    }

    fn label(&self, features: &[f64]) -> Result<i64, InferenceError> {
        check_input_width(self.coefficients.len(), features)?;
        let &[negative, positive] = self.classes.as_slice() else {
            return Err(InferenceError::malformed(format!(
                "logistic regression is binary, found {} classes",
                self.classes.len()
            )));
        };

        if self.decision_function(features) > 0.0 {
            Ok(positive)
        } else {
            Ok(negative)
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.classes.len() != 2 {
            return Err(format!(
                "logistic regression is binary, found {} classes",
                self.classes.len()
            ));
        }
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "logistic regression has {} coefficients, expected {FEATURE_COUNT}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err("logistic regression parameters must be finite".to_string());
        }
        Ok(())
    }
}

/// Tree in the flat array layout used by common tree exporters.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise the row goes left
/// when `x[feature[i]] <= threshold[i]`. `value[i]` holds per-class weights.
/// `classes` defaults to `[0, 1]`; inside a forest it may be omitted and must
/// otherwise match the forest's classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<i64>>,
}

impl DecisionTree {
    pub fn classes(&self) -> &[i64] {
        self.classes.as_deref().unwrap_or(&DEFAULT_CLASSES)
    }

    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Descend to a leaf. Every step must move to a higher node index, so the
    /// walk ends within `node_count` steps even for unvalidated arrays.
    fn leaf_value(&self, features: &[f64]) -> Result<&[f64], InferenceError> {
        let mut node = 0usize;
        loop {
            let (Some(&left), Some(&right)) =
                (self.children_left.get(node), self.children_right.get(node))
            else {
                return Err(InferenceError::malformed(format!(
                    "tree node {node} is out of range"
                )));
            };

            if left == LEAF {
                return self
                    .value
                    .get(node)
                    .map(Vec::as_slice)
                    .ok_or_else(|| InferenceError::malformed(format!("leaf {node} has no value")));
            }

            let value = self
                .feature
                .get(node)
                .and_then(|column| usize::try_from(*column).ok())
                .and_then(|column| features.get(column))
                .ok_or_else(|| {
                    InferenceError::malformed(format!("node {node} splits on an unknown feature"))
                })?;
            let threshold = self.threshold.get(node).ok_or_else(|| {
                InferenceError::malformed(format!("node {node} has no threshold"))
            })?;

            let next = if *value <= *threshold { left } else { right };
            if next <= node as i64 {
                return Err(InferenceError::malformed(format!(
                    "node {node} points back to node {next}"
                )));
            }
            node = next as usize;
        }
    }

    /// Structural checks that make `leaf_value` succeed for every full row.
    fn validate(&self, class_count: usize) -> Result<(), String> {
        let nodes = self.node_count();
        if nodes == 0 {
            return Err("decision tree has no nodes".to_string());
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err(format!(
                "decision tree arrays disagree on node count (expected {nodes})"
            ));
        }

        for node in 0..nodes {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node} has a right child but no left child"));
                }
                let weights = &self.value[node];
                if weights.len() != class_count {
                    return Err(format!(
                        "leaf {node} has {} class weights, expected {class_count}",
                        weights.len()
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!("leaf {node} has invalid class weights"));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(format!("node {node} points to invalid child {child}"));
                }
            }
            let column = self.feature[node];
            if column < 0 || column >= FEATURE_COUNT as i64 {
                return Err(format!("node {node} splits on unknown feature {column}"));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {node} has a non-finite threshold"));
            }
        }
        Ok(())
    }
}

/// Ensemble of trees; class probabilities are averaged across trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
}

impl RandomForest {
    pub fn probabilities(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::malformed("random forest has no trees"));
        }

        let mut totals = vec![0.0; self.classes.len()];
        for (index, tree) in self.trees.iter().enumerate() {
            let weights = tree.leaf_value(features)?;
            if weights.len() != totals.len() {
                return Err(InferenceError::malformed(format!(
                    "tree {index} leaf has {} class weights, forest has {} classes",
                    weights.len(),
                    totals.len()
                )));
            }
            let sum: f64 = weights.iter().sum();
            if sum > 0.0 {
                for (total, weight) in totals.iter_mut().zip(weights) {
                    *total += weight / sum;
                }
            }
        }
        let tree_count = self.trees.len() as f64;
        totals.iter_mut().for_each(|total| *total /= tree_count);
        Ok(totals)
    }

    fn label(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let probabilities = self.probabilities(features)?;
        class_at(&self.classes, argmax(&probabilities))
    }

    fn validate(&self) -> Result<(), String> {
        validate_classes(&self.classes)?;
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            if let Some(own) = &tree.classes {
                if *own != self.classes {
                    return Err(format!(
                        "tree {index} declares classes {own:?}, forest uses {:?}",
                        self.classes
                    ));
                }
            }
            tree.validate(self.classes.len())
                .map_err(|detail| format!("tree {index}: {detail}"))?;
        }
        Ok(())
    }
}
