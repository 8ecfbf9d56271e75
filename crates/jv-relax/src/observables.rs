//! Observational constraints for the gas giants.

use jv_core::constants::G_CGS;
use jv_core::units::{
    Length, Mass, Temperature, Time, k, kg, km, s, to_cm, to_grams, to_kelvin, to_seconds,
};
use jv_tof::GravityMoments;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Bodies with built-in constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPreset {
    #[default]
    Jupiter,
    Saturn,
}

impl BodyPreset {
    pub fn body(self) -> Body {
        match self {
            Self::Jupiter => Body::jupiter(),
            Self::Saturn => Body::saturn(),
        }
    }
}

/// Observed bulk properties and gravity of one planet.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: &'static str,
    pub mass: Mass,
    pub r_eq: Length,
    pub r_pol: Length,
    pub r_vol: Length,
    /// 1-bar temperature
    pub t_surface: Temperature,
    pub rotation_period: Time,
    /// Observed J2, J4, J6
    pub j: [f64; 3],
    /// 1-sigma uncertainties of `j`
    pub j_sigma: [f64; 3],
    /// Radius `j` is normalised to
    pub j_ref_radius: Length,
}

impl Body {
    /// Juno gravity (Durante et al. 2020), System III rotation.
    pub fn jupiter() -> Self {
        Self {
            name: "jupiter",
            mass: kg(1.898_125e27),
            r_eq: km(71_492.0),
            r_pol: km(66_854.0),
            r_vol: km(69_911.0),
            t_surface: k(166.1),
            rotation_period: s(35_729.71),
            j: [14_696.5063e-6, -586.6085e-6, 34.2007e-6],
            j_sigma: [0.0017e-6, 0.0024e-6, 0.0067e-6],
            j_ref_radius: km(71_492.0),
        }
    }

    /// Cassini Grand Finale gravity (Iess et al. 2019), rotation from seismology.
    pub fn saturn() -> Self {
        Self {
            name: "saturn",
            mass: kg(5.683_19e26),
            r_eq: km(60_268.0),
            r_pol: km(54_364.0),
            r_vol: km(58_232.0),
            t_surface: k(135.0),
            rotation_period: s(38_014.0),
            j: [16_290.573e-6, -935.314e-6, 86.340e-6],
            j_sigma: [0.028e-6, 0.037e-6, 0.087e-6],
            j_ref_radius: km(60_330.0),
        }
    }

    pub fn mass_cgs(&self) -> f64 {
        to_grams(self.mass)
    }

    pub fn r_eq_cgs(&self) -> f64 {
        to_cm(self.r_eq)
    }

    pub fn t_surface_k(&self) -> f64 {
        to_kelvin(self.t_surface)
    }

    /// Spin frequency [rad s^-1].
    pub fn omega(&self) -> f64 {
        2.0 * PI / to_seconds(self.rotation_period)
    }

    /// m = w^2 r^3 / (G M) at radius `r_cm`.
    pub fn rotation_parameter(&self, r_cm: f64) -> f64 {
        self.omega().powi(2) * r_cm.powi(3) / (G_CGS * self.mass_cgs())
    }

    /// m at the volumetric mean radius.
    pub fn rotation_parameter_mean(&self) -> f64 {
        self.rotation_parameter(to_cm(self.r_vol))
    }

    /// Uncertainty-weighted distance of model J2..J6 from the observation.
    ///
    /// `model_a_cm` is the radius the model moments are normalised to; they
    /// are rescaled to the observation's reference radius first.
    pub fn mahalanobis(&self, model: &GravityMoments, model_a_cm: f64) -> f64 {
        let rescaled = model.rescaled(model_a_cm, to_cm(self.j_ref_radius));
        rescaled
            .observed()
            .iter()
            .zip(self.j.iter().zip(&self.j_sigma))
            .map(|(m, (obs, sig))| ((m - obs) / sig).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jupiter_rotation_parameter() {
        let jup = Body::jupiter();
        let m = jup.rotation_parameter(jup.r_eq_cgs());
        assert!((m - 0.0892).abs() < 1e-3, "m = {m}");
        assert!(jup.rotation_parameter_mean() < m);
    }

    #[test]
    fn observed_moments_score_zero() {
        let sat = Body::saturn();
        let obs = GravityMoments {
            j2: sat.j[0],
            j4: sat.j[1],
            j6: sat.j[2],
            j8: 0.0,
        };
        let a = to_cm(sat.j_ref_radius);
        assert!(sat.mahalanobis(&obs, a) < 1e-9);
    }

    #[test]
    fn one_sigma_offset_scores_one() {
        let jup = Body::jupiter();
        let model = GravityMoments {
            j2: jup.j[0] + jup.j_sigma[0],
            j4: jup.j[1],
            j6: jup.j[2],
            j8: 0.0,
        };
        let d = jup.mahalanobis(&model, jup.r_eq_cgs());
        assert!((d - 1.0).abs() < 1e-6, "d = {d}");
    }

    #[test]
    fn presets_parse() {
        let b: BodyPreset = serde_yaml::from_str("saturn").unwrap();
        assert_eq!(b.body().name, "saturn");
    }
}
