use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::artifacts::{
    ArtifactLoadError, InferenceError, ModelArtifact, Predict, Rescale, ScalerArtifact,
};
use super::decision::LoanDecision;
use super::domain::{ApplicationRecord, InvalidInput, LoanApplicationForm};
use super::features::FeatureVector;
use crate::config::ArtifactConfig;

/// Immutable handle over the fitted scaler and trained model.
///
/// Built once at startup and shared across requests; every call is independent
/// of the ones before it.
pub struct LoanApprovalEngine<S, M> {
    scaler: Arc<S>,
    model: Arc<M>,
}

/// Engine backed by the JSON artifacts.
pub type ArtifactEngine = LoanApprovalEngine<ScalerArtifact, ModelArtifact>;

impl<S, M> Clone for LoanApprovalEngine<S, M> {
    fn clone(&self) -> Self {
        Self {
            scaler: Arc::clone(&self.scaler),
            model: Arc::clone(&self.model),
        }
    }
}

impl<S, M> fmt::Debug for LoanApprovalEngine<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoanApprovalEngine").finish_non_exhaustive()
    }
}

impl<S, M> LoanApprovalEngine<S, M>
where
    S: Rescale,
    M: Predict,
{
    pub fn new(scaler: Arc<S>, model: Arc<M>) -> Self {
        Self { scaler, model }
    }

    /// Validate, encode, rescale and classify one submission.
    pub fn assess(
        &self,
        form: &LoanApplicationForm,
    ) -> Result<PredictionOutcome, PredictionError> {
        let record = ApplicationRecord::from_form(form)?;
        Ok(self.assess_record(&record)?)
    }

    /// Run inference for a record that already passed validation.
    pub fn assess_record(
        &self,
        record: &ApplicationRecord,
    ) -> Result<PredictionOutcome, InferenceError> {
        let features = FeatureVector::assemble(record);
        let scaled_features = self.rescale(&features)?;
        let label = self.model.predict(scaled_features.as_slice())?;
        let decision = LoanDecision::from_label(label)?;

        debug!(
            decision = decision.label(),
            label,
            ?features,
            "loan application assessed"
        );

        Ok(PredictionOutcome {
            decision,
            features,
            scaled_features,
        })
    }

    /// The display string for a submission: `"Approved"` or `"Rejected"`.
    pub fn predict_status(&self, form: &LoanApplicationForm) -> Result<&'static str, PredictionError> {
        self.assess(form).map(|outcome| outcome.decision.label())
    }

    /// Copy of `features` with only the continuous columns replaced by scaler output.
    pub fn rescale(&self, features: &FeatureVector) -> Result<FeatureVector, InferenceError> {
        let rescaled = self.scaler.rescale(&features.scaled_block())?;
        let mut scaled = *features;
        scaled.replace_scaled_block(&rescaled)?;
        Ok(scaled)
    }
}

impl ArtifactEngine {
    pub fn from_paths<P, Q>(model_path: P, scaler_path: Q) -> Result<Self, ArtifactLoadError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let model = ModelArtifact::from_path(model_path.as_ref())?;
        let scaler = ScalerArtifact::from_path(scaler_path.as_ref())?;

        info!(
            model = %model_path.as_ref().display(),
            family = model.family(),
            scaler = %scaler_path.as_ref().display(),
            scheme = scaler.scheme(),
            "prediction artifacts loaded"
        );

        Ok(Self::new(Arc::new(scaler), Arc::new(model)))
    }

    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactLoadError> {
        Self::from_paths(&config.model_path, &config.scaler_path)
    }
}

/// Result of one assessment, including the rows that were fed to each stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub decision: LoanDecision,
    /// Encoded row before rescaling.
    pub features: FeatureVector,
    /// Row handed to the classifier.
    pub scaled_features: FeatureVector,
}

impl PredictionOutcome {
    pub fn status(&self) -> &'static str {
        self.decision.label()
    }

    pub fn view(&self) -> PredictionView {
        PredictionView {
            status: self.decision.label(),
            label: self.decision.class(),
            features: self.features,
            scaled_features: self.scaled_features,
        }
    }
}

/// Serialized response for HTTP and `--json` CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub status: &'static str,
    pub label: u8,
    pub features: FeatureVector,
    pub scaled_features: FeatureVector,
}

/// Error raised by [`LoanApprovalEngine::assess`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}
