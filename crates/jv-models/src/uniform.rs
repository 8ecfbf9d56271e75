//! Single homogeneous envelope.

use crate::error::{ModelResult, check_fraction};
use crate::structure::{LayerComposition, LayeredStructure};
use crate::transition::Transition;
use serde::{Deserialize, Serialize};

/// Constant y and z throughout. z is the mass knob and y the helium knob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uniform {
    pub y: f64,
    pub z: f64,
}

impl LayeredStructure for Uniform {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn validate(&self) -> ModelResult<()> {
        check_fraction(self.y, "y")?;
        check_fraction(self.z, "z")
    }

    fn composition(&self, _lambda: f64) -> LayerComposition {
        LayerComposition {
            y: self.y,
            z: self.z,
        }
    }

    fn transitions(&self) -> Vec<Transition> {
        Vec::new()
    }

    fn y_knob_weight(&self, _lambda: f64) -> f64 {
        1.0
    }

    fn y_knob_name(&self) -> &'static str {
        "y"
    }

    fn y_knob(&self) -> f64 {
        self.y
    }

    fn set_y_knob(&mut self, value: f64) {
        self.y = value;
    }

    fn mass_knob_name(&self) -> &'static str {
        "z"
    }

    fn mass_knob(&self) -> f64 {
        self.z
    }

    fn set_mass_knob(&mut self, value: f64) {
        self.z = value;
    }

    fn mass_knob_bounds(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}
