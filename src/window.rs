//! Fixed-length input windows.
//!
//! An [`InputWindow`] holds one observation per time step, already
//! coerced to the model's element type and ready to be laid out as the
//! `(batch, timesteps, features)` tensor the LSTM expects.

use crate::error::InferenceError;
use ndarray::Array3;
use serde_json::Value;

/// Number of time steps the model consumes per prediction.
pub const SEQUENCE_LENGTH: usize = 30;

/// Number of observed variables per time step.
pub const NUM_FEATURES: usize = 1;

/// Input tensor shape: one sample, [`SEQUENCE_LENGTH`] steps, [`NUM_FEATURES`] feature.
pub const INPUT_SHAPE: (usize, usize, usize) = (1, SEQUENCE_LENGTH, NUM_FEATURES);

/// One window of observations, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct InputWindow {
    values: Vec<f32>,
}

impl InputWindow {
    /// Create a window from already-numeric observations.
    ///
    /// The length is not checked here; [`InputWindow::to_tensor`] fails
    /// if it does not match [`SEQUENCE_LENGTH`].
    ///
    /// # Example
    /// ```
    /// use forecast_serve::InputWindow;
    /// let window = InputWindow::new((1..=30).map(|v| v as f32).collect());
    /// assert_eq!(window.len(), 30);
    /// ```
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Coerce raw JSON elements into a window.
    ///
    /// Each element must be a JSON number that fits in an `f32`, a boolean
    /// (`false` is 0, `true` is 1), or a one-element list holding either,
    /// as in a `(30, 1)` column. The first element that is none of these
    /// is reported with its index.
    pub fn from_json(values: &[Value]) -> Result<Self, InferenceError> {
        let values = values
            .iter()
            .enumerate()
            .map(|(index, value)| coerce(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { values })
    }

    /// Number of observations in the window.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observations, oldest first.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Lay the window out as a `(1, 30, 1)` tensor.
    pub fn to_tensor(&self) -> Result<Array3<f32>, InferenceError> {
        Array3::from_shape_vec(INPUT_SHAPE, self.values.clone()).map_err(|e| {
            InferenceError::Shape {
                len: self.values.len(),
                shape: INPUT_SHAPE,
                reason: e.to_string(),
            }
        })
    }
}

fn coerce(index: usize, value: &Value) -> Result<f32, InferenceError> {
    let scalar = match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    };

    let number = match scalar {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    let Some(number) = number else {
        return Err(InferenceError::NonNumeric {
            index,
            value: value.clone(),
        });
    };

    let narrowed = number as f32;
    if !narrowed.is_finite() {
        return Err(InferenceError::OutOfRange {
            index,
            value: number,
        });
    }

    Ok(narrowed)
}
