//! HTTP forecasting service over a pre-trained LSTM.
//!
//! This crate loads an ONNX export of a time-series model once at startup and
//! serves single-step forecasts for 30-value input windows over `POST /predict`.

pub mod api;
pub mod config;
pub mod error;
pub mod predictor;
pub mod window;

pub use api::{create_router, AppState};
pub use config::ServeConfig;
pub use error::{InferenceError, ValidationError};
pub use predictor::{predict, Config, Forecaster, LstmPredictor};
pub use window::{InputWindow, SEQUENCE_LENGTH};

/// Library-wide error type for startup paths.
pub type Result<T> = anyhow::Result<T>;
