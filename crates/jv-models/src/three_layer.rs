//! Core, inner envelope and outer envelope.

use crate::error::{ModelError, ModelResult, check_fraction, check_radii};
use crate::structure::{LayerComposition, LayeredStructure, YKnob};
use crate::transition::Transition;
use serde::{Deserialize, Serialize};

/// Smallest core the mass knob may shrink to.
const MIN_CORE_RADIUS: f64 = 1e-2;
/// Gap kept between the core and the envelope transition.
const MIN_LAYER_GAP: f64 = 1e-2;

/// Three homogeneous layers separated by sharp jumps.
///
/// The core radius is the mass knob. The helium knob is the inner envelope's
/// y by default; the core shares that y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeLayer {
    /// Outer envelope Y / (X + Y)
    pub y1: f64,
    /// Outer envelope metallicity
    pub z1: f64,
    /// Inner envelope Y / (X + Y)
    #[serde(default = "default_y2")]
    pub y2: f64,
    /// Inner envelope metallicity
    pub z2: f64,
    #[serde(default = "default_z_core")]
    pub z_core: f64,
    /// Core radius
    #[serde(default = "default_r_core")]
    pub r_core: f64,
    /// Inner/outer envelope transition radius
    #[serde(default = "default_r_trans")]
    pub r_trans: f64,
    #[serde(default = "default_y_knob")]
    pub y_knob: YKnob,
}

fn default_y2() -> f64 {
    0.35
}
fn default_z_core() -> f64 {
    1.0
}
fn default_r_core() -> f64 {
    0.1
}
fn default_r_trans() -> f64 {
    0.8
}
fn default_y_knob() -> YKnob {
    YKnob::Inner
}

impl ThreeLayer {
    /// Outer envelope given; everything else at its default.
    pub fn new(y1: f64, z1: f64, z2: f64) -> Self {
        Self {
            y1,
            z1,
            y2: default_y2(),
            z2,
            z_core: default_z_core(),
            r_core: default_r_core(),
            r_trans: default_r_trans(),
            y_knob: default_y_knob(),
        }
    }
}

impl LayeredStructure for ThreeLayer {
    fn name(&self) -> &'static str {
        "three-layer"
    }

    fn validate(&self) -> ModelResult<()> {
        check_fraction(self.y1, "y1")?;
        check_fraction(self.z1, "z1")?;
        check_fraction(self.y2, "y2")?;
        check_fraction(self.z2, "z2")?;
        check_fraction(self.z_core, "z_core")?;
        check_radii(&[("r_core", self.r_core), ("r_trans", self.r_trans)])?;
        if self.r_trans - self.r_core < MIN_LAYER_GAP {
            return Err(ModelError::InvalidParam {
                what: "r_core",
                reason: "core must sit clearly inside the envelope transition",
            });
        }
        Ok(())
    }

    fn composition(&self, lambda: f64) -> LayerComposition {
        if lambda <= self.r_core {
            LayerComposition {
                y: self.y2,
                z: self.z_core,
            }
        } else if lambda <= self.r_trans {
            LayerComposition {
                y: self.y2,
                z: self.z2,
            }
        } else {
            LayerComposition {
                y: self.y1,
                z: self.z1,
            }
        }
    }

    fn transitions(&self) -> Vec<Transition> {
        vec![Transition::jump(self.r_core), Transition::jump(self.r_trans)]
    }

    fn y_knob_weight(&self, lambda: f64) -> f64 {
        let outer = lambda > self.r_trans;
        match (self.y_knob, outer) {
            (YKnob::Outer, true) | (YKnob::Inner, false) => 1.0,
            _ => 0.0,
        }
    }

    fn y_knob_name(&self) -> &'static str {
        match self.y_knob {
            YKnob::Outer => "y1",
            YKnob::Inner => "y2",
        }
    }

    fn y_knob(&self) -> f64 {
        match self.y_knob {
            YKnob::Outer => self.y1,
            YKnob::Inner => self.y2,
        }
    }

    fn set_y_knob(&mut self, value: f64) {
        match self.y_knob {
            YKnob::Outer => self.y1 = value,
            YKnob::Inner => self.y2 = value,
        }
    }

    fn mass_knob_name(&self) -> &'static str {
        "r_core"
    }

    fn mass_knob(&self) -> f64 {
        self.r_core
    }

    fn set_mass_knob(&mut self, value: f64) {
        self.r_core = value;
    }

    fn mass_knob_bounds(&self) -> (f64, f64) {
        (MIN_CORE_RADIUS, self.r_trans - MIN_LAYER_GAP)
    }

    fn mass_knob_is_radius(&self) -> bool {
        true
    }
}
