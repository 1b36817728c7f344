use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::artifacts::{Predict, Rescale};
use super::domain::LoanApplicationForm;
use super::engine::{LoanApprovalEngine, PredictionError};

/// Router exposing the prediction endpoint over a shared engine.
pub fn prediction_router<S, M>(engine: Arc<LoanApprovalEngine<S, M>>) -> Router
where
    S: Rescale + 'static,
    M: Predict + 'static,
{
    Router::new()
        .route("/api/v1/loan/predictions", post(predict_handler::<S, M>))
        .with_state(engine)
}

pub(crate) async fn predict_handler<S, M>(
    State(engine): State<Arc<LoanApprovalEngine<S, M>>>,
    axum::Json(form): axum::Json<LoanApplicationForm>,
) -> Response
where
    S: Rescale + 'static,
    M: Predict + 'static,
{
    match engine.assess(&form) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome.view())).into_response(),
        Err(PredictionError::InvalidInput(error)) => {
            warn!(field = %error.field, reason = %error.reason, "loan application rejected");
            let payload = json!({
                "error": error.to_string(),
                "field": error.field,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(%other, "loan prediction failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
