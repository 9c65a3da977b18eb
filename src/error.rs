//! Error types for the request path.
//!
//! Startup code (config parsing, model loading) uses [`crate::Result`].
//! Anything that can fail while serving a request is one of the two
//! typed errors below, so the HTTP layer can map it to a status code.

use serde_json::Value;
use thiserror::Error;

/// The request did not carry a usable input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Sequence missing, empty, not a list, or of the wrong length
    #[error("Input must be a list of 30 numeric values.")]
    InvalidSequence,
}

/// Failure while coercing, reshaping, or running the model.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// An element of the sequence is not a JSON number
    #[error("sequence[{index}] is not a numeric value: {value}")]
    NonNumeric { index: usize, value: Value },

    /// A JSON number too large to be stored as f32
    #[error("sequence[{index}] is out of range for a 32-bit float: {value}")]
    OutOfRange { index: usize, value: f64 },

    /// The values could not be laid out in the model's input shape
    #[error("cannot reshape {len} values into shape {shape:?}: {reason}")]
    Shape {
        len: usize,
        shape: (usize, usize, usize),
        reason: String,
    },

    /// ONNX Runtime rejected the input or failed during the forward pass
    #[error("model inference failed: {0}")]
    Runtime(String),

    #[error("model produced an empty output tensor")]
    EmptyOutput,

    /// NaN or infinity cannot be encoded as a JSON number
    #[error("model produced a non-finite forecast: {0}")]
    NonFinite(f32),

    /// The session lock was poisoned by a panic in another request
    #[error("model session is unavailable")]
    Unavailable,

    /// The blocking inference task panicked or was cancelled
    #[error("inference task failed: {0}")]
    Task(String),
}

impl From<ort::Error> for InferenceError {
    fn from(err: ort::Error) -> Self {
        InferenceError::Runtime(err.to_string())
    }
}
