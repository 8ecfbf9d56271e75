//! Outer driver errors and their kinds.

use jv_eos::EosError;
use jv_models::ModelError;
use jv_tof::TofError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type RelaxResult<T> = Result<T, RelaxError>;

/// Failure category, used to route failed runs without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// EOS tables missing or unreadable
    Initialization,
    /// EOS queried outside its tabulated domain
    OutOfRange,
    /// Iteration budget exhausted
    Convergence,
    /// NaN or Inf in density, gradient, pressure or moments
    NumericFault,
    /// Configuration rejected before iterating
    InvalidConfig,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initialization => "initialization",
            Self::OutOfRange => "out_of_range",
            Self::Convergence => "convergence",
            Self::NumericFault => "numeric_fault",
            Self::InvalidConfig => "invalid_config",
        };
        f.write_str(s)
    }
}

/// Relative residuals of the last outer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Residuals {
    /// Largest relative change of J2, J4, J6 since the previous iteration
    pub j: f64,
    pub ymean: f64,
    pub mass: f64,
    pub iterations: usize,
}

impl fmt::Display for Residuals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dJ = {:.3e}, dY = {:.3e}, dM = {:.3e} after {} iterations",
            self.j, self.ymean, self.mass, self.iterations
        )
    }
}

#[derive(Error, Debug)]
pub enum RelaxError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Outer iteration did not converge: {residuals}")]
    ConvergenceFailure { residuals: Residuals },

    #[error(transparent)]
    Eos(#[from] EosError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tof(#[from] TofError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelaxError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidConfig { what: what.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } | Self::Io(_) | Self::Yaml(_) | Self::Json(_) => {
                ErrorKind::InvalidConfig
            }
            Self::ConvergenceFailure { .. } => ErrorKind::Convergence,
            Self::Eos(e) => eos_kind(e),
            Self::Model(e) => model_kind(e),
            Self::Tof(e) => match e {
                TofError::Model(m) => model_kind(m),
                TofError::NumericFault { .. } | TofError::ShapeSolve { .. } => {
                    ErrorKind::NumericFault
                }
                TofError::InnerConvergence { .. } => ErrorKind::Convergence,
                TofError::InvalidOption { .. } | TofError::Grid { .. } => ErrorKind::InvalidConfig,
            },
        }
    }

    /// Residuals of a convergence failure.
    pub fn residuals(&self) -> Option<&Residuals> {
        match self {
            Self::ConvergenceFailure { residuals } => Some(residuals),
            _ => None,
        }
    }
}

fn eos_kind(err: &EosError) -> ErrorKind {
    match err {
        EosError::Initialization { .. } => ErrorKind::Initialization,
        EosError::OutOfRange { .. } => ErrorKind::OutOfRange,
        EosError::NonPhysical { .. } => ErrorKind::NumericFault,
        EosError::InvalidArg { .. } => ErrorKind::InvalidConfig,
    }
}

fn model_kind(err: &ModelError) -> ErrorKind {
    match err {
        ModelError::Eos(e) => eos_kind(e),
        ModelError::InvalidParam { .. } | ModelError::LengthMismatch { .. } => {
            ErrorKind::InvalidConfig
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_eos_errors_keep_their_kind() {
        let range = EosError::OutOfRange {
            what: "logp",
            value: 2.0,
            min: 4.0,
            max: 16.0,
        };
        let err = RelaxError::Tof(TofError::Model(ModelError::Eos(range)));
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        let nan = EosError::NonPhysical {
            what: "rho",
            value: f64::NAN,
        };
        assert_eq!(RelaxError::Eos(nan).kind(), ErrorKind::NumericFault);
    }

    #[test]
    fn numeric_and_convergence_are_distinct() {
        let fault = RelaxError::Tof(TofError::NumericFault {
            what: "pressure",
            value: f64::INFINITY,
        });
        let stalled = RelaxError::ConvergenceFailure {
            residuals: Residuals {
                j: 1e-3,
                ymean: 0.0,
                mass: 2e-4,
                iterations: 5,
            },
        };
        assert_eq!(fault.kind(), ErrorKind::NumericFault);
        assert_eq!(stalled.kind(), ErrorKind::Convergence);
        assert!(stalled.to_string().contains("5 iterations"));
        assert_eq!(stalled.residuals().map(|r| r.iterations), Some(5));
    }
}
