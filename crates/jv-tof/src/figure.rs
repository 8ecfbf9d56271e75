//! Level-surface figure functions and their multipole kernels.
//!
//! Level `k` has radius `r(mu) = lambda_k * sigma(mu)` in units of the mean
//! radius, with `sigma = 1 + s0 + s2 P2 + s4 P4 + s6 P6 + s8 P8`. `s0` is not
//! free: it keeps the enclosed volume equal to that of the sphere of radius
//! lambda, `(1/2) ∫ sigma^3 dmu = 1`.

use crate::legendre::{EvenQuadrature, N_HARMONICS, even_legendre};
use nalgebra::{Matrix4, Vector4};
use std::f64::consts::PI;

/// Free figure functions per level: s2, s4, s6, s8.
pub const N_SHAPE: usize = N_HARMONICS - 1;

const NORMALIZE_MAX_ITERS: usize = 50;
const SHAPE_MAX_ITERS: usize = 40;
const SHAPE_STEP_TOL: f64 = 1e-13;
/// Largest figure-function change accepted in one Newton step.
const SHAPE_MAX_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelShape {
    pub s0: f64,
    pub s: [f64; N_SHAPE],
}

impl LevelShape {
    pub fn sphere() -> Self {
        Self::default()
    }

    /// `sigma` at a node with even Legendre values `p`.
    #[inline]
    pub fn sigma(&self, p: &[f64; N_HARMONICS]) -> f64 {
        1.0 + self.s0
            + self.s[0] * p[1]
            + self.s[1] * p[2]
            + self.s[2] * p[3]
            + self.s[3] * p[4]
    }

    /// Equatorial `sigma` (mu = 0).
    pub fn equatorial(&self) -> f64 {
        self.sigma(&even_legendre(0.0))
    }

    /// Polar `sigma` (mu = 1).
    pub fn polar(&self) -> f64 {
        self.sigma(&[1.0; N_HARMONICS])
    }

    /// Solve for `s0` by Newton. Returns false if it fails to settle.
    pub fn normalize(&mut self, quad: &EvenQuadrature) -> bool {
        for _ in 0..NORMALIZE_MAX_ITERS {
            let (mut v, mut dv) = (0.0, 0.0);
            for (w, p) in quad.weight.iter().zip(&quad.legendre) {
                let sg = self.sigma(p);
                v += w * sg * sg * sg;
                dv += w * sg * sg;
            }
            let h = 0.5 * v - 1.0;
            let step = h / (1.5 * dv);
            self.s0 -= step;
            if step.abs() < 1e-15 {
                return true;
            }
        }
        false
    }

    /// d s0 / d s_{2j} implied by the volume constraint.
    pub fn ds0_ds(&self, quad: &EvenQuadrature) -> [f64; N_SHAPE] {
        let mut num = [0.0; N_SHAPE];
        let mut den = 0.0;
        for (w, p) in quad.weight.iter().zip(&quad.legendre) {
            let sg2 = self.sigma(p).powi(2);
            den += w * sg2;
            for j in 0..N_SHAPE {
                num[j] += w * sg2 * p[j + 1];
            }
        }
        num.map(|n| -n / den)
    }
}

/// Multipole kernels of one level surface.
///
/// `f[n] = 2 pi ∫ r^(2n+3)/(2n+3) P_2n dmu` (exterior) and
/// `g[n] = 2 pi ∫ phi_n(r) P_2n dmu` (interior) with `phi_0 = r^2/2`,
/// `phi_1 = ln r` and `phi_n = r^(2-2n)/(2-2n)` otherwise. A shell of
/// constant density between two levels contributes `rho * (kernel difference)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelKernels {
    pub f: [f64; N_HARMONICS],
    pub g: [f64; N_HARMONICS],
}

pub fn level_kernels(lambda: f64, shape: &LevelShape, quad: &EvenQuadrature) -> LevelKernels {
    let mut out = LevelKernels::default();
    for (w, p) in quad.weight.iter().zip(&quad.legendre) {
        let r = lambda * shape.sigma(p);
        let r2 = r * r;
        let inv_r2 = 1.0 / r2;

        let mut rp = r2 * r;
        for n in 0..N_HARMONICS {
            out.f[n] += w * rp / (2 * n + 3) as f64 * p[n];
            rp *= r2;
        }

        out.g[0] += w * 0.5 * r2 * p[0];
        out.g[1] += w * r.ln() * p[1];
        let mut rm = inv_r2;
        for n in 2..N_HARMONICS {
            out.g[n] += w * rm / (2.0 - 2.0 * n as f64) * p[n];
            rm *= inv_r2;
        }
    }
    for n in 0..N_HARMONICS {
        out.f[n] *= 2.0 * PI;
        out.g[n] *= 2.0 * PI;
    }
    out
}

/// Frozen gravitational field seen by one level, in units of G R_m^2.
///
/// `d[n]` sums the mass inside the level and `dp[n]` the mass outside it;
/// `q` is the centrifugal coefficient `m M / (2 R_m^3)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelField {
    pub d: [f64; N_HARMONICS],
    pub dp: [f64; N_HARMONICS],
    pub q: f64,
}

impl LevelField {
    /// Total potential and its radial derivative at radius `r`.
    #[inline]
    pub fn potential(&self, r: f64, mu: f64, p: &[f64; N_HARMONICS]) -> (f64, f64) {
        let inv_r = 1.0 / r;
        let inv_r2 = inv_r * inv_r;
        let r2 = r * r;
        let sin2 = 1.0 - mu * mu;

        let mut u = self.q * r2 * sin2;
        let mut du = 2.0 * self.q * r * sin2;

        let mut ext = inv_r; // r^-(2n+1)
        let mut int = 1.0; // r^(2n)
        for n in 0..N_HARMONICS {
            let nf = n as f64;
            u += (self.d[n] * ext + self.dp[n] * int) * p[n];
            let d_ext = -(2.0 * nf + 1.0) * self.d[n] * ext;
            let d_int = 2.0 * nf * self.dp[n] * int;
            du += (d_ext + d_int) * inv_r * p[n];
            ext *= inv_r2;
            int *= r2;
        }
        (u, du)
    }

    /// Mean of the potential over the level, `(1/2) ∫ U dmu`.
    pub fn mean_potential(&self, lambda: f64, shape: &LevelShape, quad: &EvenQuadrature) -> f64 {
        let mut acc = 0.0;
        for ((w, p), &mu) in quad.weight.iter().zip(&quad.legendre).zip(&quad.mu) {
            let r = lambda * shape.sigma(p);
            acc += w * self.potential(r, mu, p).0;
        }
        0.5 * acc
    }
}

/// Newton-solve the figure functions that make `field` constant on the level.
///
/// Drives `∫ U P_2i dmu` to zero for i = 1..4 with `s0` slaved to the
/// volume constraint. Returns the iteration count, or `None` on failure.
pub fn solve_level_shape(
    lambda: f64,
    shape: &mut LevelShape,
    field: &LevelField,
    quad: &EvenQuadrature,
) -> Option<usize> {
    // The interior monopole is constant on every level and only adds noise.
    let mut field = *field;
    field.dp[0] = 0.0;
    for iter in 0..SHAPE_MAX_ITERS {
        if !shape.normalize(quad) {
            return None;
        }
        let ds0 = shape.ds0_ds(quad);

        let mut residual = Vector4::<f64>::zeros();
        let mut jac = Matrix4::<f64>::zeros();
        for ((w, p), &mu) in quad.weight.iter().zip(&quad.legendre).zip(&quad.mu) {
            let r = lambda * shape.sigma(p);
            let (u, du) = field.potential(r, mu, p);
            for i in 0..N_SHAPE {
                residual[i] += w * u * p[i + 1];
                for j in 0..N_SHAPE {
                    jac[(i, j)] += w * du * lambda * (p[j + 1] + ds0[j]) * p[i + 1];
                }
            }
        }

        let mut step = jac.lu().solve(&(-residual))?;
        let largest = step.amax();
        if !largest.is_finite() {
            return None;
        }
        if largest > SHAPE_MAX_STEP {
            step *= SHAPE_MAX_STEP / largest;
        }
        for j in 0..N_SHAPE {
            shape.s[j] += step[j];
        }
        if largest < SHAPE_STEP_TOL {
            return shape.normalize(quad).then_some(iter + 1);
        }
    }
    None
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalised_shapes_enclose_unit_volume(
            s2 in -0.1_f64..0.1,
            s4 in -0.01_f64..0.01,
            s6 in -0.001_f64..0.001,
        ) {
            let quad = EvenQuadrature::default();
            let mut shape = LevelShape { s0: 0.0, s: [s2, s4, s6, 0.0] };
            prop_assert!(shape.normalize(&quad));
            let v: f64 = quad.integrate(quad.legendre.iter().map(|p| shape.sigma(p).powi(3)));
            prop_assert!((0.5 * v - 1.0).abs() < 1e-13);
        }
    }
}
