//! Composition model errors.

use jv_eos::EosError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Parameter set rejected before any evaluation.
    #[error("Invalid model parameter {what}: {reason}")]
    InvalidParam {
        what: &'static str,
        reason: &'static str,
    },

    /// Columns of a level evaluation differ in length.
    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Eos(#[from] EosError),
}

/// Fraction check shared by every variant.
pub(crate) fn check_fraction(value: f64, what: &'static str) -> ModelResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::InvalidParam {
            what,
            reason: "must lie in [0, 1]",
        })
    }
}

/// Strictly increasing radii inside (0, 1).
pub(crate) fn check_radii(radii: &[(&'static str, f64)]) -> ModelResult<()> {
    let mut prev = 0.0;
    for &(what, r) in radii {
        if !(r > prev && r < 1.0) {
            return Err(ModelError::InvalidParam {
                what,
                reason: "radii must increase strictly inside (0, 1)",
            });
        }
        prev = r;
    }
    Ok(())
}
