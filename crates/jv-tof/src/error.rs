//! Figure solver errors.

use jv_core::JvError;
use jv_models::ModelError;
use thiserror::Error;

pub type TofResult<T> = Result<T, TofError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TofError {
    #[error("Invalid ToF option: {what}")]
    InvalidOption { what: &'static str },

    #[error("Grid error: {what}")]
    Grid { what: String },

    /// Non-finite density, gradient, pressure or moment.
    #[error("Numeric fault in {what}: {value}")]
    NumericFault { what: &'static str, value: f64 },

    /// Per-level shape Newton did not settle.
    #[error("Level shape solve failed at level {level} after {iterations} iterations")]
    ShapeSolve { level: usize, iterations: usize },

    /// Inner figure iteration exhausted its budget.
    #[error("Inner figure iteration stalled after {iterations} iterations (metric {metric:e})")]
    InnerConvergence { iterations: usize, metric: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<JvError> for TofError {
    fn from(err: JvError) -> Self {
        match err {
            JvError::NonFinite { what, value } => TofError::NumericFault { what, value },
        }
    }
}
