//! Forecast inference interface.
//!
//! Provides the [`LstmPredictor`] that loads an ONNX export of the trained
//! LSTM once at startup, and the [`Forecaster`] trait the HTTP layer
//! depends on.

use crate::error::InferenceError;
use crate::window::InputWindow;
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// Model artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model/lstm_model.onnx";

/// Configuration for the LSTM predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the ONNX model file
    pub model_path: PathBuf,

    /// Enable full graph optimization
    pub optimize_graph: bool,

    /// Threads used inside a single forward pass
    pub intra_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            optimize_graph: true,
            intra_threads: 1,
        }
    }
}

/// Anything that maps one input window to a scalar forecast.
pub trait Forecaster: Send + Sync {
    /// Run the model on `window` and return the forecast for the next step.
    fn forecast(&self, window: &InputWindow) -> Result<f32, InferenceError>;
}

/// LSTM forecaster backed by an ONNX Runtime session.
///
/// The session is loaded once and never replaced. `Session::run` needs
/// exclusive access, so concurrent requests take turns on the mutex for
/// the duration of the forward pass only.
pub struct LstmPredictor {
    session: Mutex<Session>,

    /// Name of the output tensor the forecast is read from
    output_name: String,
}

impl LstmPredictor {
    /// Load the ONNX model described by `config`.
    ///
    /// Fails if the file is missing, cannot be parsed, or declares no
    /// inputs or outputs.
    ///
    /// # Example
    /// ```no_run
    /// use forecast_serve::{Config, LstmPredictor};
    ///
    /// let predictor = LstmPredictor::load(Config::default()).unwrap();
    /// ```
    pub fn load(config: Config) -> crate::Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(if config.optimize_graph {
                GraphOptimizationLevel::Level3
            } else {
                GraphOptimizationLevel::Level1
            })?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(&config.model_path)
            .with_context(|| {
                format!("failed to load model from {}", config.model_path.display())
            })?;

        let input_names: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        if input_names.is_empty() {
            anyhow::bail!("model {} declares no inputs", config.model_path.display());
        }

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .with_context(|| format!("model {} declares no outputs", config.model_path.display()))?;

        info!(
            path = %config.model_path.display(),
            inputs = ?input_names,
            output = %output_name,
            "Loaded forecasting model"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Forecaster for LstmPredictor {
    fn forecast(&self, window: &InputWindow) -> Result<f32, InferenceError> {
        let input_tensor = Value::from_array(window.to_tensor()?)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Unavailable)?;
        let outputs = session.run(ort::inputs![input_tensor])?;

        let output = outputs
            .get(&self.output_name)
            .ok_or(InferenceError::EmptyOutput)?;
        let (_, data) = output.try_extract_tensor::<f32>()?;

        // Output is (batch, 1); row-major, so the first element is [0][0].
        let forecast = data.first().copied().ok_or(InferenceError::EmptyOutput)?;
        Ok(forecast)
    }
}

/// Coerce a raw sequence, run it through `forecaster`, and check the result.
///
/// This is the whole inference path for one request: no normalization is
/// applied on either side of the model.
pub fn predict(
    forecaster: &dyn Forecaster,
    sequence: &[serde_json::Value],
) -> Result<f32, InferenceError> {
    let window = InputWindow::from_json(sequence)?;
    let forecast = forecaster.forecast(&window)?;

    if !forecast.is_finite() {
        return Err(InferenceError::NonFinite(forecast));
    }

    debug!(forecast, "Generated forecast");
    Ok(forecast)
}
