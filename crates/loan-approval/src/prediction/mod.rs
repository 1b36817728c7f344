//! Loan application encoding and inference.
//!
//! Flow: [`LoanApplicationForm`] is validated into an [`ApplicationRecord`],
//! laid out as a [`FeatureVector`], the continuous columns are rescaled, and the
//! classifier label is formatted as a [`LoanDecision`].

pub mod artifacts;
pub mod batch;
pub mod decision;
pub mod domain;
pub mod engine;
pub mod features;
pub mod router;

#[cfg(test)]
mod tests;

pub use artifacts::{
    ArtifactKind, ArtifactLoadError, InferenceError, ModelArtifact, Predict, Rescale,
    ScalerArtifact,
};
pub use batch::{score_csv, score_csv_path, BatchEntry, BatchError, BatchReport};
pub use decision::LoanDecision;
pub use domain::{
    Answer, ApplicationRecord, CreditHistory, Dependents, Education, FormField, Gender,
    InvalidInput, LoanApplicationForm, PropertyArea,
};
pub use engine::{
    ArtifactEngine, LoanApprovalEngine, PredictionError, PredictionOutcome, PredictionView,
};
pub use features::{FeatureColumn, FeatureVector, FEATURE_COUNT, SCALED_COLUMNS};
pub use router::prediction_router;
