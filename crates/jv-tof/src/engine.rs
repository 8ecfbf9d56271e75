//! Inner relaxation: density, gravity and figure to self-consistency.
//!
//! Each inner iteration:
//! 1. temperature along the adiabat from the current pressure (gradient
//!    lagged one iteration)
//! 2. EOS density on every level through the composition model
//! 3. multipole kernels of the current level shapes, shell densities, and
//!    the field on every level; gravity is normalised to the target mass
//! 4. moments, mass and a new hydrostatic pressure profile
//! 5. per-level Newton solve of the figure functions in the frozen field
//!
//! The loop stops when J2 and the EOS-implied mass both change by less than
//! `inner_tol` between iterations. The EOS density itself is never rescaled:
//! any mismatch with the target mass is left for the outer driver.

use crate::error::{TofError, TofResult};
use crate::figure::{LevelField, LevelKernels, LevelShape, level_kernels, solve_level_shape};
use crate::grid::{GridSpacing, RadialGrid};
use crate::hydrostatic::{adiabat, polytrope_guess, pressure_profile};
use crate::legendre::{EvenQuadrature, N_HARMONICS};
use crate::moments::GravityMoments;
use jv_core::ensure_all_finite;
use jv_models::CompositionModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Gradient used before the EOS has been consulted once.
const COLD_START_GRADA: f64 = 0.3;
/// J2 floor of the inner metric; non-rotating bodies have J2 = 0.
const INNER_J2_FLOOR: f64 = 1e-4;

/// Options of the figure solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TofOptions {
    /// Theory-of-figures order. Only 4 is implemented.
    pub order: u32,
    /// Number of levels
    pub nz: usize,
    pub spacing: GridSpacing,
    /// Inner convergence tolerance on J2 and mass
    pub inner_tol: f64,
    pub max_inner_iters: usize,
    /// Gauss-Legendre nodes in mu (even)
    pub quadrature_nodes: usize,
}

impl Default for TofOptions {
    fn default() -> Self {
        Self {
            order: 4,
            nz: 4096,
            spacing: GridSpacing::default(),
            inner_tol: 1e-10,
            max_inner_iters: 300,
            quadrature_nodes: crate::legendre::DEFAULT_NODES,
        }
    }
}

impl TofOptions {
    pub fn validate(&self) -> TofResult<()> {
        if self.order != 4 {
            return Err(TofError::InvalidOption {
                what: "only 4th-order theory of figures is supported",
            });
        }
        if self.nz < 8 {
            return Err(TofError::InvalidOption {
                what: "nz must be at least 8",
            });
        }
        if !(self.inner_tol > 0.0 && self.inner_tol < 1e-3) {
            return Err(TofError::InvalidOption {
                what: "inner_tol must lie in (0, 1e-3)",
            });
        }
        if self.max_inner_iters == 0 {
            return Err(TofError::InvalidOption {
                what: "max_inner_iters must be positive",
            });
        }
        if self.quadrature_nodes < 8 || self.quadrature_nodes % 2 != 0 {
            return Err(TofError::InvalidOption {
                what: "quadrature_nodes must be even and at least 8",
            });
        }
        Ok(())
    }
}

/// What the figure must match: cgs throughout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureTarget {
    /// Target mass [g], used to normalise gravity
    pub mass: f64,
    /// Equatorial radius [cm]
    pub req: f64,
    /// Rotation parameter m = w^2 R_m^3 / (G M)
    pub small: f64,
    /// Surface pressure [dyn cm^-2]
    pub p_surf: f64,
    /// Surface temperature [K]
    pub t_surf: f64,
}

/// Converged figure and the structure it was computed on.
///
/// Doubles as the warm start of the next solve.
#[derive(Debug, Clone)]
pub struct Figure {
    pub grid: RadialGrid,
    pub shapes: Vec<LevelShape>,
    /// Pressure and temperature the EOS was evaluated at
    pub logp: Vec<f64>,
    pub logt: Vec<f64>,
    /// EOS density per level [g cm^-3]
    pub rho: Vec<f64>,
    pub grada: Vec<f64>,
    pub gamma1: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub dy_dknob: Vec<f64>,
    /// Dimensionless shell volumes (units of R_m^3)
    pub shell_volume: Vec<f64>,
    pub moments: GravityMoments,
    /// EOS-implied mass [g]
    pub mass: f64,
    /// Mean and equatorial radius [cm]
    pub r_mean: f64,
    pub r_eq: f64,
    pub small: f64,
    pub iterations: usize,
}

impl Figure {
    pub fn lambda(&self) -> &[f64] {
        self.grid.lambda()
    }

    pub fn r_polar(&self) -> f64 {
        self.shapes
            .last()
            .map_or(f64::NAN, |s| self.r_mean * s.polar())
    }

    /// Mass [g] of arbitrary level densities on the frozen structure.
    pub fn mass_of(&self, level_rho: &[f64]) -> f64 {
        let shells = self.grid.shell_values(level_rho);
        let m: f64 = shells
            .iter()
            .zip(&self.shell_volume)
            .map(|(r, v)| r * v)
            .sum();
        m * self.r_mean.powi(3)
    }

    fn hhe_shell_masses(&self) -> Vec<f64> {
        let rho = self.grid.shell_values(&self.rho);
        let z = self.grid.shell_values(&self.z);
        rho.iter()
            .zip(&z)
            .zip(&self.shell_volume)
            .map(|((r, z), v)| r * (1.0 - z) * v)
            .collect()
    }

    /// Mean Y / (X + Y) by H-He mass.
    pub fn helium_mean(&self) -> f64 {
        self.hhe_weighted(&self.y)
    }

    /// d(mean y)/d(helium knob) with density held fixed.
    pub fn helium_mean_sensitivity(&self) -> f64 {
        self.hhe_weighted(&self.dy_dknob)
    }

    fn hhe_weighted(&self, level_values: &[f64]) -> f64 {
        let weights = self.hhe_shell_masses();
        let values = self.grid.shell_values(level_values);
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return f64::NAN;
        }
        weights.iter().zip(&values).map(|(w, v)| w * v).sum::<f64>() / total
    }
}

/// The rotating-figure solver. Holds no per-model state.
#[derive(Debug, Clone)]
pub struct FigureSolver {
    options: TofOptions,
    quad: EvenQuadrature,
}

impl FigureSolver {
    pub fn new(options: TofOptions) -> TofResult<Self> {
        options.validate()?;
        let quad = EvenQuadrature::new(options.quadrature_nodes);
        Ok(Self { options, quad })
    }

    pub fn options(&self) -> &TofOptions {
        &self.options
    }

    /// Levels for the model's current boundaries.
    pub fn build_grid(&self, model: &CompositionModel) -> TofResult<RadialGrid> {
        let structure = model.structure();
        RadialGrid::build(
            self.options.nz,
            self.options.spacing,
            &structure.alignment_radii(),
            &structure.discontinuities(),
        )
    }

    /// Relax the figure of `model` for `target`, warm-started from `warm`
    /// when its grid has the same size.
    pub fn solve(
        &self,
        model: &CompositionModel,
        target: &FigureTarget,
        warm: Option<&Figure>,
    ) -> TofResult<Figure> {
        let grid = self.build_grid(model)?;
        let n = grid.len();
        let lambda = grid.lambda().to_vec();

        let (mut shapes, mut logp, mut grada) = match warm {
            Some(w) if w.shapes.len() == n => (w.shapes.clone(), w.logp.clone(), w.grada.clone()),
            _ => (
                vec![LevelShape::sphere(); n],
                polytrope_guess(&lambda, target.mass, target.req, target.p_surf),
                vec![COLD_START_GRADA; n],
            ),
        };
        let logt_surf = target.t_surf.log10();
        let mut r_mean = target.req / shapes[n - 1].equatorial();
        let mut prev: Option<(f64, f64)> = None;
        let mut metric = f64::INFINITY;

        for iter in 0..self.options.max_inner_iters {
            let logt = adiabat(&logp, &grada, logt_surf);
            let props = model.evaluate(&lambda, &logp, &logt)?;
            ensure_all_finite(&props.rho, "density")?;
            ensure_all_finite(&props.grada, "grada")?;

            let kernels: Vec<LevelKernels> = lambda
                .iter()
                .zip(&shapes)
                .map(|(&l, s)| level_kernels(l, s, &self.quad))
                .collect();
            let shell_kernels = shell_differences(&kernels);
            let shell_volume: Vec<f64> = shell_kernels.iter().map(|k| k.f[0]).collect();

            let shell_rho = grid.shell_values(&props.rho);
            let m_tilde: f64 = shell_rho
                .iter()
                .zip(&shell_volume)
                .map(|(r, v)| r * v)
                .sum();
            let r3 = r_mean.powi(3);
            let mass = m_tilde * r3;
            let m_tilde_target = target.mass / r3;
            let scale = m_tilde_target / m_tilde;
            if !scale.is_finite() {
                return Err(TofError::NumericFault {
                    what: "mass normalisation",
                    value: scale,
                });
            }
            let rho_grav: Vec<f64> = shell_rho.iter().map(|r| r * scale).collect();

            let q = 0.5 * target.small * m_tilde_target;
            let fields = level_fields(&rho_grav, &shell_kernels, q);
            let moments =
                GravityMoments::from_exterior(&fields[n - 1].d, shapes[n - 1].equatorial());
            if !moments.all_finite() {
                return Err(TofError::NumericFault {
                    what: "moments",
                    value: moments.j2,
                });
            }

            if let Some((j2_prev, mass_prev)) = prev {
                let dj = (moments.j2 - j2_prev).abs() / moments.j2.abs().max(INNER_J2_FLOOR);
                let dm = (mass - mass_prev).abs() / mass.abs();
                metric = dj.max(dm);
            }
            debug!(
                iter,
                j2 = moments.j2,
                mass,
                r_mean,
                metric,
                "inner iteration"
            );

            let u0: Vec<f64> = fields
                .iter()
                .zip(&lambda)
                .zip(&shapes)
                .map(|((f, &l), s)| f.mean_potential(l, s, &self.quad))
                .collect();
            let pressure = pressure_profile(&rho_grav, &u0, r_mean, target.p_surf);
            if let Some(&bad) = pressure.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
                return Err(TofError::NumericFault {
                    what: "pressure",
                    value: bad,
                });
            }

            if metric < self.options.inner_tol {
                return Ok(Figure {
                    r_eq: target.req,
                    grid,
                    logp,
                    logt,
                    rho: props.rho,
                    grada: props.grada,
                    gamma1: props.gamma1,
                    y: props.y,
                    z: props.z,
                    dy_dknob: props.dy_dknob,
                    shell_volume,
                    moments,
                    mass,
                    r_mean,
                    small: target.small,
                    iterations: iter + 1,
                    shapes,
                });
            }
            prev = Some((moments.j2, mass));
            logp = pressure.iter().map(|p| p.log10()).collect();
            grada = props.grada;

            for (k, (shape, field)) in shapes.iter_mut().zip(&fields).enumerate() {
                solve_level_shape(lambda[k], shape, field, &self.quad).ok_or(
                    TofError::ShapeSolve {
                        level: k,
                        iterations: iter + 1,
                    },
                )?;
            }
            r_mean = target.req / shapes[n - 1].equatorial();
            trace!(iter, s2_surface = shapes[n - 1].s[0], "shapes updated");
        }

        Err(TofError::InnerConvergence {
            iterations: self.options.max_inner_iters,
            metric,
        })
    }
}

/// Kernel differences between consecutive levels; shell 0 is the central ball.
fn shell_differences(kernels: &[LevelKernels]) -> Vec<LevelKernels> {
    let mut out = Vec::with_capacity(kernels.len());
    out.push(kernels[0]);
    for pair in kernels.windows(2) {
        let mut d = LevelKernels::default();
        for n in 0..N_HARMONICS {
            d.f[n] = pair[1].f[n] - pair[0].f[n];
            d.g[n] = pair[1].g[n] - pair[0].g[n];
        }
        out.push(d);
    }
    out
}

/// Field on every level: exterior sums over shells inside (inclusive) and
/// interior sums over shells outside.
fn level_fields(rho: &[f64], shells: &[LevelKernels], q: f64) -> Vec<LevelField> {
    let n = rho.len();
    let mut fields = vec![
        LevelField {
            q,
            ..Default::default()
        };
        n
    ];

    let mut inside = [0.0; N_HARMONICS];
    for k in 0..n {
        for h in 0..N_HARMONICS {
            inside[h] += rho[k] * shells[k].f[h];
        }
        fields[k].d = inside;
    }

    let mut outside = [0.0; N_HARMONICS];
    for k in (0..n).rev() {
        fields[k].dp = outside;
        for h in 0..N_HARMONICS {
            outside[h] += rho[k] * shells[k].g[h];
        }
    }
    fields
}
