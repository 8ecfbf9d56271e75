//! Hydrostatic pressure, adiabatic temperature and the cold-start guess.

use jv_core::constants::G_CGS;
use std::f64::consts::PI;

/// Pressure on every level [dyn cm^-2], integrated inward from `p_surf`.
///
/// Level potentials `u0` are in units of `G R_m^2`; shell `k + 1` carries
/// the pressure difference between levels `k + 1` and `k`:
/// `P_k = P_{k+1} + rho_{k+1} G R_m^2 (U_k - U_{k+1})`.
pub fn pressure_profile(shell_rho: &[f64], u0: &[f64], r_mean: f64, p_surf: f64) -> Vec<f64> {
    let n = u0.len();
    let scale = G_CGS * r_mean * r_mean;
    let mut p = vec![0.0; n];
    p[n - 1] = p_surf;
    for k in (0..n - 1).rev() {
        p[k] = p[k + 1] + shell_rho[k + 1] * scale * (u0[k] - u0[k + 1]);
    }
    p
}

/// log10 T integrated inward along the adiabat from the surface temperature,
/// with the gradient averaged over each step.
pub fn adiabat(logp: &[f64], grada: &[f64], logt_surf: f64) -> Vec<f64> {
    let n = logp.len();
    let mut logt = vec![0.0; n];
    logt[n - 1] = logt_surf;
    for k in (0..n - 1).rev() {
        let g = 0.5 * (grada[k] + grada[k + 1]);
        logt[k] = logt[k + 1] + g * (logp[k] - logp[k + 1]);
    }
    logt
}

/// log10 P of the n = 1 polytrope with the given mass and radius, as a
/// starting profile: `P = K rho_c^2 (sin(pi x) / (pi x))^2 + p_surf`.
pub fn polytrope_guess(lambda: &[f64], mass: f64, radius: f64, p_surf: f64) -> Vec<f64> {
    let k = 2.0 * G_CGS * radius * radius / PI;
    let rho_c = PI * mass / (4.0 * radius.powi(3));
    lambda
        .iter()
        .map(|&x| {
            let arg = PI * x;
            let theta = if arg > 0.0 { arg.sin() / arg } else { 1.0 };
            (k * rho_c * rho_c * theta * theta + p_surf).log10()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_grows_inward() {
        let u0 = [3.0, 2.5, 2.0, 1.0];
        let rho = [1.0, 1.0, 0.5, 0.1];
        let p = pressure_profile(&rho, &u0, 1.0, 0.0);
        assert_eq!(p[3], 0.0);
        assert!(p.windows(2).all(|w| w[0] > w[1]));
        // Shell 3 spans levels 2..3
        assert!((p[2] / (0.1 * G_CGS) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn constant_gradient_adiabat() {
        let logp = [13.0, 10.0, 6.0];
        let logt = adiabat(&logp, &[0.3; 3], 2.0);
        assert!((logt[0] - (2.0 + 0.3 * 7.0)).abs() < 1e-12);
        assert_eq!(logt[2], 2.0);
    }

    #[test]
    fn polytrope_guess_reaches_surface_pressure() {
        let lambda = [0.01, 0.5, 1.0];
        let logp = polytrope_guess(&lambda, 1.9e30, 7e9, 1e6);
        assert!(logp[0] > logp[1] && logp[1] > logp[2]);
        assert!((logp[2] - 6.0).abs() < 1e-6);
        assert!(logp[0] > 13.0 && logp[0] < 14.5);
    }
}
