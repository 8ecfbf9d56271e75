//! EOS errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for EOS operations.
pub type EosResult<T> = Result<T, EosError>;

/// Errors produced by the EOS service.
///
/// `Initialization` happens once, at construction, and is never retried.
/// `OutOfRange` happens during lookup and aborts the model run that asked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EosError {
    /// Table data missing, unreadable or not a regular (log P, log T) grid.
    #[error("EOS initialization failed for {}: {reason}", path.display())]
    Initialization { path: PathBuf, reason: String },

    /// Query outside the tabulated domain. No extrapolation is attempted.
    #[error("EOS query out of range: {what} = {value} not in [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// EOS returned a non-finite or non-positive value inside its domain.
    #[error("Non-physical EOS output: {what} = {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Invalid argument (mismatched columns, fractions outside [0, 1], ...).
    #[error("Invalid EOS argument: {what}")]
    InvalidArg { what: &'static str },
}

impl EosError {
    pub(crate) fn init(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Initialization {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
