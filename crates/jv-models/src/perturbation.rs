//! Ad-hoc density perturbation in log P.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// `rho -> rho * (1 + amplitude * sigmoid((logP - centroid) / width))`.
///
/// Used to mimic structure the composition alone does not carry, such as a
/// stable layer. Zero amplitude leaves the EOS density untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityPerturbation {
    pub amplitude: f64,
    /// log10 P [dyn cm^-2] of the midpoint
    pub centroid: f64,
    /// Width in log10 P
    pub width: f64,
}

impl Default for DensityPerturbation {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            centroid: 10.0,
            width: 1.0,
        }
    }
}

impl DensityPerturbation {
    pub fn validate(&self) -> ModelResult<()> {
        if !(self.width > 0.0 && self.width.is_finite()) {
            return Err(ModelError::InvalidParam {
                what: "drho_w",
                reason: "width must be positive",
            });
        }
        if !(self.amplitude > -1.0 && self.amplitude.is_finite()) {
            return Err(ModelError::InvalidParam {
                what: "drho_a",
                reason: "amplitude must exceed -1",
            });
        }
        if !self.centroid.is_finite() {
            return Err(ModelError::InvalidParam {
                what: "drho_c",
                reason: "centroid must be finite",
            });
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.amplitude != 0.0
    }

    /// Multiplicative density factor at `logp`.
    pub fn factor(&self, logp: f64) -> f64 {
        if !self.is_active() {
            return 1.0;
        }
        let x = (logp - self.centroid) / self.width;
        1.0 + self.amplitude / (1.0 + (-x).exp())
    }
}
