//! Result surface of a relaxation.

use crate::error::Residuals;
use jv_models::InteriorModel;
use jv_tof::{Figure, GravityMoments};
use serde::{Deserialize, Serialize};

/// A named knob and its final value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnobValue {
    pub name: String,
    pub value: f64,
}

/// Per-level arrays of the converged model, centre first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadialProfile {
    /// Mean radius of each level [cm]
    pub r_mean: Vec<f64>,
    /// Equatorial radius of each level [cm]
    pub r_eq: Vec<f64>,
    pub logp: Vec<f64>,
    pub logt: Vec<f64>,
    pub rho: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub grada: Vec<f64>,
    pub gamma1: Vec<f64>,
}

impl RadialProfile {
    pub fn from_figure(fig: &Figure) -> Self {
        Self {
            r_mean: fig.lambda().iter().map(|l| l * fig.r_mean).collect(),
            r_eq: fig
                .lambda()
                .iter()
                .zip(&fig.shapes)
                .map(|(l, s)| l * s.equatorial() * fig.r_mean)
                .collect(),
            logp: fig.logp.clone(),
            logt: fig.logt.clone(),
            rho: fig.rho.clone(),
            y: fig.y.clone(),
            z: fig.z.clone(),
            grada: fig.grada.clone(),
            gamma1: fig.gamma1.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.rho.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rho.is_empty()
    }
}

/// Converged interior model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxedModel {
    pub model: String,
    /// Harmonics normalised to the equatorial radius
    pub moments: GravityMoments,
    /// EOS-implied mass [g]
    pub mass: f64,
    pub target_mass: f64,
    pub ymean: f64,
    /// Mean and equatorial radius [cm]
    pub r_mean: f64,
    pub r_eq: f64,
    pub r_polar: f64,
    /// Rotation parameter m of the final figure
    pub small: f64,
    pub y_knob: KnobValue,
    pub mass_knob: KnobValue,
    pub residuals: Residuals,
    /// Inner iterations summed over all outer iterations
    pub inner_iterations: usize,
    /// Final parameters of the interior model
    pub structure: InteriorModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RadialProfile>,
}

impl RelaxedModel {
    pub fn j2(&self) -> f64 {
        self.moments.j2
    }

    pub fn j4(&self) -> f64 {
        self.moments.j4
    }

    pub fn j6(&self) -> f64 {
        self.moments.j6
    }
}
