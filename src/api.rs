//! HTTP API for forecasting
//!
//! A single route built on axum:
//!
//! - `POST /predict` - Forecast the next value of a 30-step sequence
//!
//! ## Example
//!
//! ```rust,ignore
//! use forecast_serve::api::{create_router, AppState};
//!
//! let state = AppState::new(predictor);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::{
    error::{InferenceError, ValidationError},
    predictor::{self, Forecaster},
    window::SEQUENCE_LENGTH,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Model loaded at startup, read by every request
    forecaster: Arc<dyn Forecaster>,
}

impl AppState {
    /// Create new application state around a loaded model
    #[must_use]
    pub fn new(forecaster: impl Forecaster + 'static) -> Self {
        Self {
            forecaster: Arc::new(forecaster),
        }
    }

    /// Create application state from an already shared model
    #[must_use]
    pub fn from_shared(forecaster: Arc<dyn Forecaster>) -> Self {
        Self { forecaster }
    }
}

/// Predict request
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Observations, oldest first; elements are checked during inference
    #[serde(default)]
    pub sequence: Option<Vec<Value>>,
}

impl PredictRequest {
    /// Return the sequence if it has exactly [`SEQUENCE_LENGTH`] elements.
    pub fn validate(self) -> Result<Vec<Value>, ValidationError> {
        match self.sequence {
            Some(sequence) if sequence.len() == SEQUENCE_LENGTH => Ok(sequence),
            _ => Err(ValidationError::InvalidSequence),
        }
    }
}

/// Predict response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Forecast for the next time step
    pub forecast: f64,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Failure of a single request, mapped to a status code at the boundary
#[derive(Debug)]
pub enum ApiError {
    /// 400, the model is never called
    Validation(ValidationError),
    /// 500, message returned to the caller verbatim
    Inference(InferenceError),
}

impl ApiError {
    /// HTTP status for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::Inference(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::Inference(err) => {
                error!(error = %err, "Inference failed");
                err.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Create the API router
///
/// # Arguments
///
/// * `state` - Application state holding the loaded model
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .with_state(state)
}

/// Forecast handler
///
/// Body problems (not JSON, wrong content type, `sequence` not a list) are
/// reported the same way as a missing sequence.
async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let request = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected predict body");
        ValidationError::InvalidSequence
    })?;

    let sequence = request.0.validate().inspect_err(|_| {
        warn!("Rejected predict request: sequence missing or not {SEQUENCE_LENGTH} long");
    })?;

    // Forward pass is synchronous and may wait on the session lock
    let forecaster = Arc::clone(&state.forecaster);
    let forecast = tokio::task::spawn_blocking(move || {
        predictor::predict(forecaster.as_ref(), &sequence)
    })
    .await
    .map_err(|e| InferenceError::Task(e.to_string()))??;

    Ok(Json(PredictResponse {
        forecast: f64::from(forecast),
    }))
}
