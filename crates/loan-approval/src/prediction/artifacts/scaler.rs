use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::{
    check_input_width, read_json, read_json_path, ArtifactKind, ArtifactLoadError, InferenceError,
    Rescale,
};
use crate::prediction::features::SCALED_COUNT;

/// Fitted scaler parameters, one entry per continuous column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// Standardization: `(x - mean) / scale`.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Min-max normalization using the fitted `scale_` and `min_`: `x * scale + min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl ScalerArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactLoadError> {
        let artifact: Self = read_json_path(ArtifactKind::Scaler, path.as_ref())?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactLoadError> {
        let artifact: Self = read_json(ArtifactKind::Scaler, reader, "reader")?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub const fn scheme(&self) -> &'static str {
        match self {
            ScalerArtifact::Standard { .. } => "standard",
            ScalerArtifact::MinMax { .. } => "min_max",
        }
    }

    /// Offset vector, scale vector and the offset's name.
    fn parameters(&self) -> (&[f64], &[f64], &'static str) {
        match self {
            ScalerArtifact::Standard { mean, scale } => (mean.as_slice(), scale.as_slice(), "mean"),
            ScalerArtifact::MinMax { min, scale } => (min.as_slice(), scale.as_slice(), "min"),
        }
    }

    fn validate(&self) -> Result<(), ArtifactLoadError> {
        let (offsets, scale, offset_name) = self.parameters();

        for (name, values) in [(offset_name, offsets), ("scale", scale)] {
            if values.len() != SCALED_COUNT {
                return Err(ArtifactLoadError::invalid(
                    ArtifactKind::Scaler,
                    format!(
                        "{name} has {} entries, expected {SCALED_COUNT}",
                        values.len()
                    ),
                ));
            }
            if values.iter().any(|value| !value.is_finite()) {
                return Err(ArtifactLoadError::invalid(
                    ArtifactKind::Scaler,
                    format!("{name} contains a non-finite entry"),
                ));
            }
        }

        if matches!(self, ScalerArtifact::Standard { .. }) && scale.iter().any(|s| *s == 0.0) {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Scaler,
                "standard scale entries must be non-zero",
            ));
        }

        Ok(())
    }
}

impl Rescale for ScalerArtifact {
    fn rescale(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_input_width(SCALED_COUNT, values)?;
        let (offsets, scale, offset_name) = self.parameters();
        for (name, parameters) in [(offset_name, offsets), ("scale", scale)] {
            if parameters.len() != values.len() {
                return Err(InferenceError::malformed(format!(
                    "scaler {name} has {} entries for {} inputs",
                    parameters.len(),
                    values.len()
                )));
            }
        }

        let rescaled = match self {
            ScalerArtifact::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (mean, scale))| (x - mean) / scale)
                .collect(),
            ScalerArtifact::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (min, scale))| x * scale + min)
                .collect(),
        };
        Ok(rescaled)
    }
}
