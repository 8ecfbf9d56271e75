//! Run configuration: one explicit structure, validated before iterating.

use crate::error::{RelaxError, RelaxResult, Residuals};
use crate::observables::{Body, BodyPreset};
use jv_core::constants::BAR_CGS;
use jv_eos::{
    HeavyElementEos, IceRockBlend, Material, MixtureEos, PolytropicHHe, PolytropicZ, PureMaterial,
    TabulatedHHe, resolve_data_dir,
};
use jv_models::{CompositionModel, DensityPerturbation, InteriorModel};
use jv_tof::{FigureTarget, TofOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Smallest gap between boundaries, in local grid spacings.
const MIN_BOUNDARY_SPACINGS: f64 = 3.0;

/// Planet to model. Preset values can be overridden one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TargetConfig {
    pub body: BodyPreset,
    /// Rotation parameter m; from the rotation period and the volumetric
    /// radius when absent
    pub small: Option<f64>,
    pub mass_kg: Option<f64>,
    pub req_km: Option<f64>,
    pub t_surface_k: Option<f64>,
    /// Surface pressure [bar]; 1 when absent
    pub p_surface_bar: Option<f64>,
}

/// Target values in cgs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub body: Body,
    pub mass: f64,
    pub req: f64,
    pub small: f64,
    pub p_surf: f64,
    pub t_surf: f64,
}

impl ResolvedTarget {
    pub fn figure_target(&self, small: f64) -> FigureTarget {
        FigureTarget {
            mass: self.mass,
            req: self.req,
            small,
            p_surf: self.p_surf,
            t_surf: self.t_surf,
        }
    }
}

impl TargetConfig {
    pub fn resolve(&self) -> ResolvedTarget {
        let body = self.body.body();
        ResolvedTarget {
            mass: self.mass_kg.map_or_else(|| body.mass_cgs(), |m| m * 1e3),
            req: self.req_km.map_or_else(|| body.r_eq_cgs(), |r| r * 1e5),
            small: self.small.unwrap_or_else(|| body.rotation_parameter_mean()),
            p_surf: self.p_surface_bar.unwrap_or(1.0) * BAR_CGS,
            t_surf: self.t_surface_k.unwrap_or_else(|| body.t_surface_k()),
            body,
        }
    }
}

/// Outer relative tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OuterTolerances {
    pub j2n_rtol: f64,
    pub ymean_rtol: f64,
    pub mtot_rtol: f64,
}

impl Default for OuterTolerances {
    fn default() -> Self {
        Self {
            j2n_rtol: 1e-4,
            ymean_rtol: 1e-4,
            mtot_rtol: 1e-4,
        }
    }
}

impl OuterTolerances {
    /// All three residuals at or below their tolerances.
    pub fn accepts(&self, r: &Residuals) -> bool {
        r.j <= self.j2n_rtol
            && r.ymean.abs() <= self.ymean_rtol
            && r.mass.abs() <= self.mtot_rtol
    }
}

/// Heavy-element EOS choice.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeavyEosConfig {
    #[default]
    Ice,
    Serpentine,
    /// On-the-fly ice/rock blend by volume
    Blend { f_ice: f64 },
}

/// Where densities come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EosConfig {
    Tabulated {
        /// Data directory; `JOVIAN_EOS_DIR` when absent
        #[serde(default)]
        data_dir: Option<PathBuf>,
        #[serde(default)]
        heavy: HeavyEosConfig,
        /// Use the high-pressure heavy-element tables
        #[serde(default)]
        extended: bool,
    },
    /// n = 1 polytropes; each constant defaults to the built-in value.
    Analytic {
        #[serde(default)]
        k_hydrogen: Option<f64>,
        #[serde(default)]
        k_helium: Option<f64>,
        #[serde(default)]
        k_z: Option<f64>,
    },
}

impl Default for EosConfig {
    fn default() -> Self {
        Self::Tabulated {
            data_dir: None,
            heavy: HeavyEosConfig::default(),
            extended: false,
        }
    }
}

impl EosConfig {
    pub fn analytic() -> Self {
        Self::Analytic {
            k_hydrogen: None,
            k_helium: None,
            k_z: None,
        }
    }

    pub fn validate(&self) -> RelaxResult<()> {
        match self {
            Self::Tabulated {
                heavy: HeavyEosConfig::Blend { f_ice },
                ..
            } if !(0.0..=1.0).contains(f_ice) => {
                Err(RelaxError::invalid("f_ice must lie in [0, 1]"))
            }
            Self::Analytic {
                k_hydrogen,
                k_helium,
                k_z,
            } => {
                for k in [k_hydrogen, k_helium, k_z].into_iter().flatten() {
                    if !(*k > 0.0 && k.is_finite()) {
                        return Err(RelaxError::invalid("polytropic constants must be positive"));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Build the shared EOS. Table loading happens here and only here.
    pub fn build(&self) -> RelaxResult<Arc<MixtureEos>> {
        self.validate()?;
        let eos = match self {
            Self::Tabulated {
                data_dir,
                heavy,
                extended,
            } => {
                let dir = resolve_data_dir(data_dir.as_deref())?;
                let hhe = TabulatedHHe::load(&dir)?;
                let z: Arc<dyn HeavyElementEos> = match *heavy {
                    HeavyEosConfig::Ice => {
                        Arc::new(PureMaterial::load(&dir, Material::Ice, *extended)?)
                    }
                    HeavyEosConfig::Serpentine => {
                        Arc::new(PureMaterial::load(&dir, Material::Serpentine, *extended)?)
                    }
                    HeavyEosConfig::Blend { f_ice } => {
                        Arc::new(IceRockBlend::load(&dir, f_ice, *extended)?)
                    }
                };
                MixtureEos::new(Arc::new(hhe), z)
            }
            Self::Analytic {
                k_hydrogen,
                k_helium,
                k_z,
            } => {
                let default_hhe = PolytropicHHe::default();
                let hhe = PolytropicHHe::new(
                    k_hydrogen.unwrap_or(default_hhe.k_hydrogen),
                    k_helium.unwrap_or(default_hhe.k_helium),
                );
                let z = k_z.map_or_else(PolytropicZ::default, PolytropicZ::new);
                MixtureEos::new(Arc::new(hhe), Arc::new(z))
            }
        };
        Ok(Arc::new(eos))
    }
}

fn default_max_iters_outer() -> usize {
    199
}
fn default_ymean() -> f64 {
    0.275
}

/// Everything one relaxation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxConfig {
    #[serde(default)]
    pub target: TargetConfig,
    pub model: InteriorModel,
    #[serde(default)]
    pub perturbation: DensityPerturbation,
    #[serde(default)]
    pub eos: EosConfig,
    #[serde(default)]
    pub tof: TofOptions,
    #[serde(default)]
    pub tolerances: OuterTolerances,
    #[serde(default = "default_max_iters_outer")]
    pub max_iters_outer: usize,
    /// Target mean Y / (X + Y)
    #[serde(default = "default_ymean")]
    pub ymean: f64,
    /// Keep the spin frequency fixed as the mean radius changes
    #[serde(default)]
    pub adjust_small: bool,
    /// Attach the radial profile to the result
    #[serde(default)]
    pub keep_profile: bool,
}

impl RelaxConfig {
    /// Defaults everywhere except the interior model.
    pub fn new(model: InteriorModel) -> Self {
        Self {
            target: TargetConfig::default(),
            model,
            perturbation: DensityPerturbation::default(),
            eos: EosConfig::default(),
            tof: TofOptions::default(),
            tolerances: OuterTolerances::default(),
            max_iters_outer: default_max_iters_outer(),
            ymean: default_ymean(),
            adjust_small: false,
            keep_profile: false,
        }
    }

    pub fn validate(&self) -> RelaxResult<()> {
        self.tof.validate()?;
        let tol = &self.tolerances;
        for (what, v) in [
            ("j2n_rtol", tol.j2n_rtol),
            ("ymean_rtol", tol.ymean_rtol),
            ("mtot_rtol", tol.mtot_rtol),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(RelaxError::invalid(format!("{what} must be positive")));
            }
        }
        if self.tof.inner_tol >= tol.j2n_rtol {
            return Err(RelaxError::invalid("inner_tol must be tighter than j2n_rtol"));
        }
        if self.max_iters_outer == 0 {
            return Err(RelaxError::invalid("max_iters_outer must be positive"));
        }
        if !(self.ymean > 0.0 && self.ymean < 1.0) {
            return Err(RelaxError::invalid("ymean must lie in (0, 1)"));
        }

        let t = &self.target;
        for (what, v) in [
            ("mass_kg", t.mass_kg),
            ("req_km", t.req_km),
            ("t_surface_k", t.t_surface_k),
            ("p_surface_bar", t.p_surface_bar),
        ] {
            if let Some(v) = v
                && !(v > 0.0 && v.is_finite())
            {
                return Err(RelaxError::invalid(format!("{what} must be positive")));
            }
        }
        if let Some(m) = t.small
            && !(0.0..0.5).contains(&m)
        {
            return Err(RelaxError::invalid("small must lie in [0, 0.5)"));
        }

        let layers = self.model.as_structure();
        layers.validate()?;
        let (lo, hi) = self.mass_knob_bounds()?;
        let knob = layers.mass_knob();
        if !(lo..=hi).contains(&knob) {
            return Err(RelaxError::invalid(format!(
                "{} = {knob} outside [{lo}, {hi}]",
                layers.mass_knob_name()
            )));
        }
        self.perturbation.validate()?;
        self.eos.validate()?;
        self.check_boundary_resolution()
    }

    /// Interval the mass knob may move in during the run.
    ///
    /// A radius knob moves a boundary across the grid, so its interval is
    /// narrowed to keep that boundary resolved from every other one.
    pub fn mass_knob_bounds(&self) -> RelaxResult<(f64, f64)> {
        let layers = self.model.as_structure();
        let (mut lo, mut hi) = layers.mass_knob_bounds();
        if !layers.mass_knob_is_radius() {
            return Ok((lo, hi));
        }
        let levels = self.tof.spacing.levels(self.tof.nz)?;
        let knob = layers.mass_knob();
        for r in self.model.alignment_radii() {
            if r == knob {
                continue;
            }
            let near = local_spacing(&levels, r);
            if r > knob {
                let edge = r - MIN_BOUNDARY_SPACINGS * near;
                hi = hi.min(r - MIN_BOUNDARY_SPACINGS * near.max(local_spacing(&levels, edge)));
            } else {
                let edge = r + MIN_BOUNDARY_SPACINGS * near;
                lo = lo.max(r + MIN_BOUNDARY_SPACINGS * near.max(local_spacing(&levels, edge)));
            }
        }
        if lo >= hi {
            return Err(RelaxError::invalid(format!(
                "grid too coarse to move {}: no room between its neighbours",
                layers.mass_knob_name()
            )));
        }
        Ok((lo, hi))
    }

    /// Boundaries must be several grid spacings apart to land on distinct levels.
    fn check_boundary_resolution(&self) -> RelaxResult<()> {
        let levels = self.tof.spacing.levels(self.tof.nz)?;
        let radii = self.model.alignment_radii();
        for pair in radii.windows(2) {
            let needed = MIN_BOUNDARY_SPACINGS
                * local_spacing(&levels, pair[0]).max(local_spacing(&levels, pair[1]));
            if pair[1] - pair[0] < needed {
                return Err(RelaxError::invalid(format!(
                    "boundaries {} and {} are closer than {MIN_BOUNDARY_SPACINGS} grid spacings",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }

    /// Validated composition model on `eos`.
    pub fn composition_model(&self, eos: Arc<MixtureEos>) -> RelaxResult<CompositionModel> {
        Ok(CompositionModel::new(
            self.model.clone(),
            eos,
            self.perturbation,
        )?)
    }
}

/// Width of the grid cell around `b`.
fn local_spacing(levels: &[f64], b: f64) -> f64 {
    let i = levels.partition_point(|&l| l < b).clamp(1, levels.len() - 1);
    levels[i] - levels[i - 1]
}

/// Load and validate a run configuration.
pub fn load_yaml(path: &Path) -> RelaxResult<RelaxConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RelaxConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
