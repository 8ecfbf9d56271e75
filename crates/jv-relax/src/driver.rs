//! Outer convergence driver.
//!
//! Every outer iteration relaxes the figure for the current knobs, measures
//! three relative residuals (J change since the last iteration, mean helium
//! fraction, EOS-implied mass) and moves the helium knob and the mass knob
//! one scalar step each. The loop ends when all three residuals are below
//! tolerance together, or fails with the last residuals once the budget is
//! spent. EOS range errors and numeric faults abort immediately.

use crate::config::{RelaxConfig, ResolvedTarget};
use crate::error::{RelaxError, RelaxResult, Residuals};
use crate::knobs::KnobUpdater;
use crate::result::{KnobValue, RadialProfile, RelaxedModel};
use jv_core::constants::G_CGS;
use jv_eos::MixtureEos;
use jv_models::CompositionModel;
use jv_tof::{Figure, FigureSolver, GravityMoments, TofError};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, info};

/// The helium mean is linear in its knob on a frozen structure.
const Y_DAMPING: f64 = 1.0;
const Y_MAX_STEP: f64 = 0.1;
const MASS_DAMPING: f64 = 0.8;
/// Largest mass-knob step as a fraction of its interval.
const MASS_TRUST: f64 = 0.1;
/// Finite-difference step for composition-valued mass knobs.
const COMPOSITION_PROBE: f64 = 1e-3;
/// Offset that puts a probe just outside a jump.
const JUMP_PROBE: f64 = 1e-9;

/// One relaxation: configuration, composition model and figure solver.
#[derive(Debug)]
pub struct Relaxer {
    config: RelaxConfig,
    target: ResolvedTarget,
    model: CompositionModel,
    solver: FigureSolver,
}

impl Relaxer {
    /// Validate `config`, then build its EOS.
    pub fn new(config: RelaxConfig) -> RelaxResult<Self> {
        config.validate()?;
        let eos = config.eos.build()?;
        Self::with_eos(config, eos)
    }

    /// Use an EOS that is already loaded, e.g. one shared by a sweep.
    pub fn with_eos(config: RelaxConfig, eos: Arc<MixtureEos>) -> RelaxResult<Self> {
        config.validate()?;
        let model = config.composition_model(eos)?;
        let solver = FigureSolver::new(config.tof.clone())?;
        let target = config.target.resolve();
        Ok(Self {
            config,
            target,
            model,
            solver,
        })
    }

    pub fn config(&self) -> &RelaxConfig {
        &self.config
    }

    pub fn target(&self) -> &ResolvedTarget {
        &self.target
    }

    /// Composition model with the current knob values.
    pub fn model(&self) -> &CompositionModel {
        &self.model
    }

    /// Iterate the knobs until mass, mean helium and moments agree.
    pub fn relax(&mut self) -> RelaxResult<RelaxedModel> {
        let tol = self.config.tolerances;
        let y_target = self.config.ymean;
        let m_target = self.target.mass;
        let mut small = self.target.small;
        let mut omega2: Option<f64> = None;

        let layers = self.model.layers();
        let mut y_knob = KnobUpdater::new(layers.y_knob_name(), (0.0, 1.0), Y_DAMPING, Y_MAX_STEP);
        let (lo, hi) = self.config.mass_knob_bounds()?;
        let mut mass_knob = KnobUpdater::new(
            layers.mass_knob_name(),
            (lo, hi),
            MASS_DAMPING,
            MASS_TRUST * (hi - lo),
        );

        let mut warm: Option<Figure> = None;
        let mut prev: Option<GravityMoments> = None;
        let mut inner_total = 0;
        let mut residuals = Residuals::default();

        for iter in 1..=self.config.max_iters_outer {
            let fig = self
                .solver
                .solve(&self.model, &self.target.figure_target(small), warm.as_ref())?;
            inner_total += fig.iterations;

            let ymean = fig.helium_mean();
            if !ymean.is_finite() {
                return Err(TofError::NumericFault {
                    what: "mean helium fraction",
                    value: ymean,
                }
                .into());
            }
            residuals = Residuals {
                j: prev.map_or(f64::INFINITY, |p| fig.moments.relative_change(&p)),
                ymean: (ymean - y_target) / y_target,
                mass: (fig.mass - m_target) / m_target,
                iterations: iter,
            };

            let layers = self.model.layers();
            info!(
                iter,
                j2 = fig.moments.j2,
                j4 = fig.moments.j4,
                j6 = fig.moments.j6,
                dj = residuals.j,
                dy = residuals.ymean,
                dm = residuals.mass,
                y_knob = layers.y_knob(),
                mass_knob = layers.mass_knob(),
                small,
                inner = fig.iterations,
                "outer iteration"
            );

            if tol.accepts(&residuals) {
                return Ok(self.finish(fig, residuals, inner_total));
            }

            let y_slope = fig.helium_mean_sensitivity() / y_target;
            let m_slope = mass_sensitivity(&self.model, &fig)? / m_target;
            let y_step = y_knob.step(layers.y_knob(), residuals.ymean, y_slope);
            let m_step = mass_knob.step(layers.mass_knob(), residuals.mass, m_slope);
            debug!(y_slope, m_slope, y = y_step.value, m = m_step.value, "knob steps");

            let layers = self.model.layers_mut();
            layers.set_y_knob(y_step.value);
            layers.set_mass_knob(m_step.value);

            if self.config.adjust_small {
                // Spin frequency fixed at its first-iteration value.
                let w2 = *omega2.get_or_insert(small * G_CGS * m_target / fig.r_mean.powi(3));
                small = w2 * fig.r_mean.powi(3) / (G_CGS * m_target);
            }

            prev = Some(fig.moments);
            warm = Some(fig);
        }

        Err(RelaxError::ConvergenceFailure { residuals })
    }

    fn finish(&self, fig: Figure, residuals: Residuals, inner_total: usize) -> RelaxedModel {
        let layers = self.model.layers();
        RelaxedModel {
            model: layers.name().to_string(),
            moments: fig.moments,
            mass: fig.mass,
            target_mass: self.target.mass,
            ymean: fig.helium_mean(),
            r_mean: fig.r_mean,
            r_eq: fig.r_eq,
            r_polar: fig.r_polar(),
            small: fig.small,
            y_knob: KnobValue {
                name: layers.y_knob_name().to_string(),
                value: layers.y_knob(),
            },
            mass_knob: KnobValue {
                name: layers.mass_knob_name().to_string(),
                value: layers.mass_knob(),
            },
            residuals,
            inner_iterations: inner_total,
            structure: self.model.structure().clone(),
            profile: self
                .config
                .keep_profile
                .then(|| RadialProfile::from_figure(&fig)),
        }
    }
}

/// d(mass)/d(mass knob) [g] with pressure, temperature and shapes frozen.
fn mass_sensitivity(model: &CompositionModel, fig: &Figure) -> RelaxResult<f64> {
    let layers = model.layers();
    let x = layers.mass_knob();

    if layers.mass_knob_is_radius() {
        // Moving a jump at b trades (rho_in - rho_out) over 4 pi b^2 db.
        let lambda = fig.lambda();
        let i = lambda
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
            .map_or(0, |(i, _)| i);
        let logp = [fig.logp[i]; 2];
        let logt = [fig.logt[i]; 2];
        let props = model.evaluate(&[x, x + JUMP_PROBE], &logp, &logt)?;
        let drho = props.rho[0] - props.rho[1];
        return Ok(drho * 4.0 * PI * x * x * fig.r_mean.powi(3));
    }

    let (_, hi) = layers.mass_knob_bounds();
    let h = if x + COMPOSITION_PROBE <= hi {
        COMPOSITION_PROBE
    } else {
        -COMPOSITION_PROBE
    };
    let mut probe = model.clone();
    probe.layers_mut().set_mass_knob(x + h);
    let rho = probe.evaluate(fig.lambda(), &fig.logp, &fig.logt)?.rho;
    Ok((fig.mass_of(&rho) - fig.mass_of(&fig.rho)) / h)
}
