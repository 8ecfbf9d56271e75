//! jv-models: composition profiles of giant-planet interiors.
//!
//! Provides:
//! - `InteriorModel`: three-layer, dual-cavity and uniform variants with a
//!   shared `LayeredStructure` capability
//! - Linear and sigmoid composition transitions
//! - The ad-hoc density perturbation in log P
//! - `CompositionModel`, which turns (lambda, log P, log T) into density
//!   through the shared `MixtureEos`
//!
//! Each variant designates its helium knob and mass knob at construction;
//! the outer driver only ever adjusts those two numbers.

pub mod composition;
pub mod dual_cavity;
pub mod error;
pub mod perturbation;
pub mod structure;
pub mod three_layer;
pub mod transition;
pub mod uniform;

pub use composition::{CompositionModel, CompositionProfile, LevelProperties};
pub use dual_cavity::DualCavity;
pub use error::{ModelError, ModelResult};
pub use perturbation::DensityPerturbation;
pub use structure::{InteriorModel, LayerComposition, LayeredStructure, YKnob};
pub use three_layer::ThreeLayer;
pub use transition::{GradientShape, Transition};
pub use uniform::Uniform;
