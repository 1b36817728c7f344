//! Fitted scaler and trained classifier collaborators.
//!
//! The engine only sees the [`Rescale`] and [`Predict`] capabilities; the JSON
//! artifacts in this module are one way of providing them. Both are validated
//! on load so that shape problems surface at startup rather than per request.

mod model;
mod scaler;

pub use model::{DecisionTree, LogisticRegression, ModelArtifact, RandomForest};
pub use scaler::ScalerArtifact;

use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Fitted transform over the continuous columns.
pub trait Rescale: Send + Sync {
    fn rescale(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Trained classifier over a full feature row.
pub trait Predict: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError>;
}

/// Failure raised while transforming or classifying an already validated row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("rescaler returned {actual} values, expected {expected}")]
    RescaleShape { expected: usize, actual: usize },
    #[error("artifact expects {expected} inputs, received {actual}")]
    InputShape { expected: usize, actual: usize },
    #[error("rescaler produced a non-finite value for {column}")]
    NonFinite { column: &'static str },
    #[error("predictor returned label {0}, expected 0 or 1")]
    UnexpectedLabel(i64),
    #[error("artifact is inconsistent: {0}")]
    Malformed(String),
}

impl InferenceError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed(detail.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Scaler,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => f.write_str("model"),
            ArtifactKind::Scaler => f.write_str("scaler"),
        }
    }
}

/// Startup failure loading either artifact. Fatal: no prediction can be served.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("failed to read {kind} artifact at {}: {source}", path.display())]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {kind} artifact from {origin}: {source}")]
    Parse {
        kind: ArtifactKind,
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} artifact rejected: {detail}")]
    Invalid { kind: ArtifactKind, detail: String },
}

impl ArtifactLoadError {
    pub(crate) fn invalid(kind: ArtifactKind, detail: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            detail: detail.into(),
        }
    }
}

pub(crate) fn read_json_path<T: DeserializeOwned>(
    kind: ArtifactKind,
    path: &Path,
) -> Result<T, ArtifactLoadError> {
    let file = File::open(path).map_err(|source| ArtifactLoadError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    read_json(kind, BufReader::new(file), &path.display().to_string())
}

pub(crate) fn read_json<T: DeserializeOwned, R: Read>(
    kind: ArtifactKind,
    reader: R,
    origin: &str,
) -> Result<T, ArtifactLoadError> {
    serde_json::from_reader(reader).map_err(|source| ArtifactLoadError::Parse {
        kind,
        origin: origin.to_string(),
        source,
    })
}

pub(crate) fn check_input_width(expected: usize, values: &[f64]) -> Result<(), InferenceError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(InferenceError::InputShape {
            expected,
            actual: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path_and_kind() {
        let err = ScalerArtifact::from_path("/definitely/not/here/scaler.json")
            .expect_err("missing file fails");
        let message = err.to_string();
        assert!(matches!(
            err,
            ArtifactLoadError::Io {
                kind: ArtifactKind::Scaler,
                ..
            }
        ));
        assert!(message.contains("/definitely/not/here/scaler.json"));
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        let err = ModelArtifact::from_reader("{ not json".as_bytes()).expect_err("parse fails");
        assert!(matches!(
            err,
            ArtifactLoadError::Parse {
                kind: ArtifactKind::Model,
                ..
            }
        ));
    }

    #[test]
    fn unknown_artifact_kind_is_rejected() {
        let err = ModelArtifact::from_reader(r#"{"kind":"support_vector_machine"}"#.as_bytes())
            .expect_err("unsupported kind");
        assert!(matches!(err, ArtifactLoadError::Parse { .. }));
    }
}
