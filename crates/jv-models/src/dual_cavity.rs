//! Two composition transitions enclosing a middle zone.

use crate::error::{ModelError, ModelResult, check_fraction};
use crate::structure::{LayerComposition, LayeredStructure, YKnob};
use crate::transition::{GradientShape, Transition};
use serde::{Deserialize, Serialize};

/// Inner cavity, middle zone and outer envelope.
///
/// The inner band `[rii, rio]` separates the cavity from the middle zone and
/// the outer band `[roi, roo]` the middle zone from the envelope. The middle
/// zone's metallicity is the mass knob; the helium knob is the outer
/// envelope's y by default. The cavity shares the middle zone's y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualCavity {
    pub y1: f64,
    pub z1: f64,
    pub y2: f64,
    #[serde(default = "default_z2")]
    pub z2: f64,
    /// Cavity metallicity
    #[serde(default = "default_z3")]
    pub z3: f64,
    pub rii: f64,
    pub rio: f64,
    pub roi: f64,
    pub roo: f64,
    #[serde(default)]
    pub gradient_shape: GradientShape,
    #[serde(default = "default_y_knob")]
    pub y_knob: YKnob,
}

fn default_z2() -> f64 {
    0.5
}
fn default_z3() -> f64 {
    1.0
}
fn default_y_knob() -> YKnob {
    YKnob::Outer
}

impl DualCavity {
    /// Near-jump transitions of width `width` ending at `rio` and `roo`.
    pub fn with_thin_bands(y1: f64, z1: f64, y2: f64, rio: f64, roo: f64, width: f64) -> Self {
        Self {
            y1,
            z1,
            y2,
            z2: default_z2(),
            z3: default_z3(),
            rii: rio - width,
            rio,
            roi: roo - width,
            roo,
            gradient_shape: GradientShape::Sigmoid,
            y_knob: default_y_knob(),
        }
    }

    fn inner_band(&self) -> Transition {
        Transition {
            inner: self.rii,
            outer: self.rio,
            shape: self.gradient_shape,
        }
    }

    fn outer_band(&self) -> Transition {
        Transition {
            inner: self.roi,
            outer: self.roo,
            shape: self.gradient_shape,
        }
    }
}

impl LayeredStructure for DualCavity {
    fn name(&self) -> &'static str {
        "dual-cavity"
    }

    fn validate(&self) -> ModelResult<()> {
        check_fraction(self.y1, "y1")?;
        check_fraction(self.z1, "z1")?;
        check_fraction(self.y2, "y2")?;
        check_fraction(self.z2, "z2")?;
        check_fraction(self.z3, "z3")?;
        let ordered = 0.0 < self.rii
            && self.rii <= self.rio
            && self.rio < self.roi
            && self.roi <= self.roo
            && self.roo < 1.0;
        if !ordered {
            return Err(ModelError::InvalidParam {
                what: "rii/rio/roi/roo",
                reason: "need 0 < rii <= rio < roi <= roo < 1",
            });
        }
        Ok(())
    }

    fn composition(&self, lambda: f64) -> LayerComposition {
        let inner = self.inner_band();
        let outer = self.outer_band();
        if lambda <= self.rio {
            LayerComposition {
                y: self.y2,
                z: inner.value(lambda, self.z3, self.z2),
            }
        } else {
            LayerComposition {
                y: outer.value(lambda, self.y2, self.y1),
                z: outer.value(lambda, self.z2, self.z1),
            }
        }
    }

    fn transitions(&self) -> Vec<Transition> {
        vec![self.inner_band(), self.outer_band()]
    }

    fn y_knob_weight(&self, lambda: f64) -> f64 {
        let w_outer = self.outer_band().outer_weight(lambda);
        match self.y_knob {
            YKnob::Outer => w_outer,
            YKnob::Inner => 1.0 - w_outer,
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
        "z2"
    }

    fn mass_knob(&self) -> f64 {
        self.z2
    }

    fn set_mass_knob(&mut self, value: f64) {
        self.z2 = value;
    }

    fn mass_knob_bounds(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}
