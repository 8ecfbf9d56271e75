//! Analytic n = 1 polytropes standing in for tables.
//!
//! `rho = sqrt(P / K)` for every component. A sphere built from such a
//! material has radius `sqrt(pi K / (2 G))` regardless of mass, which gives
//! table-free runs a closed-form answer to converge towards.

use crate::error::{EosError, EosResult};
use crate::heavy::HeavyElementEos;
use crate::hhe::{HHeSample, HydrogenHeliumEos};
use jv_core::constants::G_CGS;
use std::f64::consts::PI;

/// Mean radius [cm] the default constants are scaled to.
pub const REFERENCE_RADIUS_CM: f64 = 6.99e9;

/// Polytropic constant whose n = 1 sphere has radius `radius_cm`.
pub fn reference_constant(radius_cm: f64) -> f64 {
    2.0 * G_CGS * radius_cm * radius_cm / PI
}

const DEFAULT_LOGP_RANGE: (f64, f64) = (4.0, 16.0);
const DEFAULT_LOGT_RANGE: (f64, f64) = (1.0, 6.0);

fn check_range(logp: f64, logt: f64, logp_range: (f64, f64)) -> EosResult<()> {
    let (pmin, pmax) = logp_range;
    if !(logp >= pmin && logp <= pmax) {
        return Err(EosError::OutOfRange {
            what: "logp",
            value: logp,
            min: pmin,
            max: pmax,
        });
    }
    let (tmin, tmax) = DEFAULT_LOGT_RANGE;
    if !(logt >= tmin && logt <= tmax) {
        return Err(EosError::OutOfRange {
            what: "logt",
            value: logt,
            min: tmin,
            max: tmax,
        });
    }
    Ok(())
}

/// Hydrogen and helium as separate n = 1 polytropes mixed by additive volume.
///
/// Thermodynamic derivatives are constant: grada = 0.3, gamma1 = chi_rho = 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolytropicHHe {
    pub k_hydrogen: f64,
    pub k_helium: f64,
    pub grada: f64,
    logp_range: (f64, f64),
}

impl Default for PolytropicHHe {
    fn default() -> Self {
        let k_ref = reference_constant(REFERENCE_RADIUS_CM);
        Self::new(1.25 * 1.25 * k_ref, 0.75 * 0.75 * k_ref)
    }
}

impl PolytropicHHe {
    pub fn new(k_hydrogen: f64, k_helium: f64) -> Self {
        Self {
            k_hydrogen,
            k_helium,
            grada: 0.3,
            logp_range: DEFAULT_LOGP_RANGE,
        }
    }

    /// Narrow or widen the accepted log P window.
    pub fn with_logp_range(mut self, min: f64, max: f64) -> Self {
        self.logp_range = (min, max);
        self
    }

    /// sqrt(K) of the H-He mix at helium fraction `y_xy`.
    pub fn sqrt_k(&self, y_xy: f64) -> f64 {
        (1.0 - y_xy) * self.k_hydrogen.sqrt() + y_xy * self.k_helium.sqrt()
    }
}

impl HydrogenHeliumEos for PolytropicHHe {
    fn name(&self) -> &str {
        "polytropic H/He (n=1)"
    }

    fn sample(&self, logp: f64, logt: f64, y_xy: f64) -> EosResult<HHeSample> {
        check_range(logp, logt, self.logp_range)?;
        if !(0.0..=1.0).contains(&y_xy) {
            return Err(EosError::InvalidArg {
                what: "y_xy must lie in [0, 1]",
            });
        }
        // 1/rho = sqrt(K_mix / P), sqrt(K) additive in y
        let logrho = 0.5 * logp - self.sqrt_k(y_xy).log10();
        Ok(HHeSample {
            logrho,
            grada: self.grada,
            gamma1: 2.0,
            chi_rho: 2.0,
            chi_t: 0.0,
        })
    }
}

/// Heavy elements as a stiffer n = 1 polytrope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolytropicZ {
    pub k: f64,
    logp_range: (f64, f64),
}

impl Default for PolytropicZ {
    fn default() -> Self {
        Self::new(0.4 * 0.4 * reference_constant(REFERENCE_RADIUS_CM))
    }
}

impl PolytropicZ {
    pub fn new(k: f64) -> Self {
        Self {
            k,
            logp_range: DEFAULT_LOGP_RANGE,
        }
    }

    pub fn with_logp_range(mut self, min: f64, max: f64) -> Self {
        self.logp_range = (min, max);
        self
    }
}

impl HeavyElementEos for PolytropicZ {
    fn name(&self) -> &str {
        "polytropic Z (n=1)"
    }

    fn logrho(&self, logp: f64, logt: f64) -> EosResult<f64> {
        check_range(logp, logt, self.logp_range)?;
        Ok(0.5 * (logp - self.k.log10()))
    }
}
