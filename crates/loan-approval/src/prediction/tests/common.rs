use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::prediction::artifacts::{InferenceError, Predict, Rescale, ScalerArtifact};
use crate::prediction::domain::LoanApplicationForm;
use crate::prediction::engine::LoanApprovalEngine;
use crate::prediction::features::{FeatureColumn, FEATURE_COUNT};

/// Applicant from the intake walkthrough: Male, married, no dependents,
/// graduate, not self employed, 5000 income, 100k over 360 days, clean credit, urban.
pub(super) fn scenario_form() -> LoanApplicationForm {
    LoanApplicationForm {
        gender: "Male".to_string(),
        married: "Yes".to_string(),
        dependents: "0".to_string(),
        education: "Graduate".to_string(),
        self_employed: "No".to_string(),
        applicant_income: 5000.0,
        coapplicant_income: 0.0,
        loan_amount: 100.0,
        loan_amount_term: 360.0,
        credit_history: 1.0,
        property_area: "Urban".to_string(),
    }
}

pub(super) fn scenario_row() -> [f64; FEATURE_COUNT] {
    [1.0, 1.0, 0.0, 0.0, 0.0, 5000.0, 0.0, 100.0, 360.0, 1.0, 2.0]
}

pub(super) fn standard_scaler() -> ScalerArtifact {
    ScalerArtifact::Standard {
        mean: vec![5403.46, 1621.25, 146.41, 342.0],
        scale: vec![6109.04, 2926.25, 85.59, 65.12],
    }
}

/// Adds a large offset so rescaled columns are easy to spot.
pub(super) struct OffsetScaler;

impl Rescale for OffsetScaler {
    fn rescale(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        Ok(values.iter().map(|value| value + 10_000.0).collect())
    }
}

/// Drops a value, as a mis-exported scaler would.
pub(super) struct TruncatingScaler;

impl Rescale for TruncatingScaler {
    fn rescale(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        Ok(values.iter().take(values.len() - 1).copied().collect())
    }
}

/// Approves exactly when the credit history column is 1.0 and records every row it sees.
#[derive(Default)]
pub(super) struct CreditHistoryModel {
    seen: Mutex<Vec<Vec<f64>>>,
}

impl CreditHistoryModel {
    pub(super) fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().expect("model mutex poisoned").clone()
    }
}

impl Predict for CreditHistoryModel {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        self.seen
            .lock()
            .expect("model mutex poisoned")
            .push(features.to_vec());
        Ok(i64::from(
            features[FeatureColumn::CreditHistory.index()] == 1.0,
        ))
    }
}

/// Always returns the configured label.
pub(super) struct FixedLabelModel(pub(super) i64);

impl Predict for FixedLabelModel {
    fn predict(&self, _features: &[f64]) -> Result<i64, InferenceError> {
        Ok(self.0)
    }
}

pub(super) fn offset_engine() -> (
    LoanApprovalEngine<OffsetScaler, CreditHistoryModel>,
    Arc<CreditHistoryModel>,
) {
    let model = Arc::new(CreditHistoryModel::default());
    let engine = LoanApprovalEngine::new(Arc::new(OffsetScaler), model.clone());
    (engine, model)
}

pub(super) fn standard_engine() -> LoanApprovalEngine<ScalerArtifact, CreditHistoryModel> {
    LoanApprovalEngine::new(
        Arc::new(standard_scaler()),
        Arc::new(CreditHistoryModel::default()),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
