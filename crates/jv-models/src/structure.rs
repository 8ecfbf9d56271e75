//! Structural variants behind one tagged type.

use crate::dual_cavity::DualCavity;
use crate::error::ModelResult;
use crate::three_layer::ThreeLayer;
use crate::transition::Transition;
use crate::uniform::Uniform;
use serde::{Deserialize, Serialize};

/// Composition at one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerComposition {
    /// Y / (X + Y)
    pub y: f64,
    pub z: f64,
}

/// Which layer's helium fraction the driver adjusts to hit the mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YKnob {
    /// Outermost envelope
    Outer,
    /// Inner envelope (three-layer) or middle zone (dual-cavity)
    Inner,
}

/// Shared capability of every structural variant.
///
/// A variant owns its parameters and decides, once at construction, which of
/// them are the helium knob and the mass knob.
pub trait LayeredStructure {
    fn name(&self) -> &'static str;

    /// Reject contradictory parameters before any iteration begins.
    fn validate(&self) -> ModelResult<()>;

    fn composition(&self, lambda: f64) -> LayerComposition;

    /// Composition transitions, innermost first.
    fn transitions(&self) -> Vec<Transition>;

    /// d y(lambda) / d (helium knob).
    fn y_knob_weight(&self, lambda: f64) -> f64;

    fn y_knob_name(&self) -> &'static str;
    fn y_knob(&self) -> f64;
    fn set_y_knob(&mut self, value: f64);

    fn mass_knob_name(&self) -> &'static str;
    fn mass_knob(&self) -> f64;
    fn set_mass_knob(&mut self, value: f64);
    /// Admissible interval for the mass knob.
    fn mass_knob_bounds(&self) -> (f64, f64);

    /// True when the mass knob is a boundary radius rather than a composition.
    ///
    /// Moving a radius does not change any level's composition on a frozen
    /// grid, so its mass sensitivity has to be taken across the jump.
    fn mass_knob_is_radius(&self) -> bool {
        false
    }
}

/// Interior model chosen at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteriorModel {
    ThreeLayer(ThreeLayer),
    DualCavity(DualCavity),
    Uniform(Uniform),
}

impl InteriorModel {
    pub fn as_structure(&self) -> &dyn LayeredStructure {
        match self {
            Self::ThreeLayer(m) => m,
            Self::DualCavity(m) => m,
            Self::Uniform(m) => m,
        }
    }

    pub fn as_structure_mut(&mut self) -> &mut dyn LayeredStructure {
        match self {
            Self::ThreeLayer(m) => m,
            Self::DualCavity(m) => m,
            Self::Uniform(m) => m,
        }
    }

    /// Radii the grid must place points on: band edges and jumps.
    pub fn alignment_radii(&self) -> Vec<f64> {
        let mut radii: Vec<f64> = self
            .as_structure()
            .transitions()
            .iter()
            .flat_map(|t| {
                if t.is_jump() {
                    vec![t.inner]
                } else {
                    vec![t.inner, t.outer]
                }
            })
            .collect();
        radii.sort_by(f64::total_cmp);
        radii.dedup();
        radii
    }

    /// Radii where composition is discontinuous.
    pub fn discontinuities(&self) -> Vec<f64> {
        self.as_structure()
            .transitions()
            .iter()
            .filter(|t| t.is_jump())
            .map(|t| t.inner)
            .collect()
    }
}
