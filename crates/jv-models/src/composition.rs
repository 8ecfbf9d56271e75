//! Composition model: structure + shared EOS + density perturbation.

use crate::error::{ModelError, ModelResult};
use crate::perturbation::DensityPerturbation;
use crate::structure::{InteriorModel, LayeredStructure};
use jv_eos::{EosQuery, MixtureEos};
use std::sync::Arc;

/// Composition on a set of levels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionProfile {
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// d y / d (helium knob) per level
    pub dy_dknob: Vec<f64>,
}

/// Everything the figure solver needs per level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelProperties {
    /// Perturbed EOS density [g cm^-3]
    pub rho: Vec<f64>,
    pub grada: Vec<f64>,
    pub gamma1: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub dy_dknob: Vec<f64>,
}

/// The density-given-pressure callback of the interior.
///
/// Holds the only mutable model state (the structure's parameters); the EOS
/// is shared read-only.
#[derive(Debug, Clone)]
pub struct CompositionModel {
    structure: InteriorModel,
    eos: Arc<MixtureEos>,
    perturbation: DensityPerturbation,
}

impl CompositionModel {
    pub fn new(
        structure: InteriorModel,
        eos: Arc<MixtureEos>,
        perturbation: DensityPerturbation,
    ) -> ModelResult<Self> {
        structure.as_structure().validate()?;
        perturbation.validate()?;
        Ok(Self {
            structure,
            eos,
            perturbation,
        })
    }

    pub fn structure(&self) -> &InteriorModel {
        &self.structure
    }

    pub fn layers(&self) -> &dyn LayeredStructure {
        self.structure.as_structure()
    }

    pub fn layers_mut(&mut self) -> &mut dyn LayeredStructure {
        self.structure.as_structure_mut()
    }

    pub fn eos(&self) -> &Arc<MixtureEos> {
        &self.eos
    }

    pub fn perturbation(&self) -> &DensityPerturbation {
        &self.perturbation
    }

    pub fn profile(&self, lambda: &[f64]) -> CompositionProfile {
        let layers = self.layers();
        let mut out = CompositionProfile {
            y: Vec::with_capacity(lambda.len()),
            z: Vec::with_capacity(lambda.len()),
            dy_dknob: Vec::with_capacity(lambda.len()),
        };
        for &l in lambda {
            let c = layers.composition(l);
            out.y.push(c.y);
            out.z.push(c.z);
            out.dy_dknob.push(layers.y_knob_weight(l));
        }
        out
    }

    /// EOS density and gradients on levels `lambda` at (log P, log T).
    pub fn evaluate(
        &self,
        lambda: &[f64],
        logp: &[f64],
        logt: &[f64],
    ) -> ModelResult<LevelProperties> {
        let n = lambda.len();
        for (what, got) in [("logp", logp.len()), ("logt", logt.len())] {
            if got != n {
                return Err(ModelError::LengthMismatch {
                    what,
                    expected: n,
                    got,
                });
            }
        }
        let CompositionProfile { y, z, dy_dknob } = self.profile(lambda);
        let cols = self.eos.evaluate(&EosQuery {
            logp,
            logt,
            y_xy: &y,
            z: &z,
        })?;
        let rho = if self.perturbation.is_active() {
            cols.rho
                .iter()
                .zip(logp)
                .map(|(&r, &lp)| r * self.perturbation.factor(lp))
                .collect()
        } else {
            cols.rho
        };
        Ok(LevelProperties {
            rho,
            grada: cols.grada,
            gamma1: cols.gamma1,
            y,
            z,
            dy_dknob,
        })
    }
}
