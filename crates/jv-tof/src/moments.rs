//! External gravitational harmonics.

use crate::legendre::N_HARMONICS;
use serde::{Deserialize, Serialize};

/// Floor below which a harmonic counts as zero in relative changes.
pub const J_FLOOR: f64 = 1e-9;

/// Even zonal harmonics normalised to the equatorial radius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GravityMoments {
    pub j2: f64,
    pub j4: f64,
    pub j6: f64,
    pub j8: f64,
}

impl GravityMoments {
    /// From the exterior multipoles of the whole body and the dimensionless
    /// equatorial radius `a`: `J_2n = -D_n / (D_0 a^2n)`.
    pub fn from_exterior(d: &[f64; N_HARMONICS], a: f64) -> Self {
        let a2 = a * a;
        let j = |n: usize| -d[n] / (d[0] * a2.powi(n as i32));
        Self {
            j2: j(1),
            j4: j(2),
            j6: j(3),
            j8: j(4),
        }
    }

    /// J2, J4, J6.
    pub fn observed(&self) -> [f64; 3] {
        [self.j2, self.j4, self.j6]
    }

    /// Largest relative change of J2, J4, J6 against `prev`.
    pub fn relative_change(&self, prev: &Self) -> f64 {
        self.observed()
            .iter()
            .zip(prev.observed())
            .map(|(&new, old)| jv_core::relative_change(new, old, J_FLOOR))
            .fold(0.0, f64::max)
    }

    /// Harmonics re-normalised from radius `a` to reference radius `r_ref`.
    pub fn rescaled(&self, a: f64, r_ref: f64) -> Self {
        let x = (a / r_ref).powi(2);
        Self {
            j2: self.j2 * x,
            j4: self.j4 * x.powi(2),
            j6: self.j6 * x.powi(3),
            j8: self.j8 * x.powi(4),
        }
    }

    pub fn all_finite(&self) -> bool {
        [self.j2, self.j4, self.j6, self.j8]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_convention() {
        let d = [2.0, -0.02, 0.001, 0.0, 0.0];
        let m = GravityMoments::from_exterior(&d, 1.0);
        assert!((m.j2 - 0.01).abs() < 1e-15);
        assert!((m.j4 + 0.0005).abs() < 1e-15);
    }

    #[test]
    fn change_uses_floor_for_zero_moments() {
        let a = GravityMoments::default();
        let b = GravityMoments {
            j2: 1e-12,
            ..Default::default()
        };
        assert!(b.relative_change(&a) < 1e-2);
        let c = GravityMoments {
            j2: 0.0101,
            j4: -5e-4,
            j6: 3e-5,
            j8: 0.0,
        };
        let d = GravityMoments { j2: 0.01, ..c };
        assert!((c.relative_change(&d) - 0.0001 / 0.0101).abs() < 1e-12);
    }

    #[test]
    fn rescaling_to_larger_radius_shrinks() {
        let m = GravityMoments {
            j2: 0.0147,
            j4: -5.9e-4,
            j6: 3.4e-5,
            j8: 0.0,
        };
        let r = m.rescaled(0.99, 1.0);
        assert!(r.j2 < m.j2 && r.j4 > m.j4);
        assert!((r.j6 / m.j6 - 0.99f64.powi(6)).abs() < 1e-12);
    }
}
