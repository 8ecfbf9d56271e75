//! jv-tof: rotating-figure gravity solver (4th-order theory of figures).
//!
//! Level surfaces are expanded in even Legendre polynomials up to P8 and
//! projected numerically with Gauss-Legendre quadrature, so the figure
//! functions are solved to 4th order in the rotation parameter without
//! tabulated expansion coefficients.
//!
//! # Modules
//! - `grid`: level radii, spacing choices and boundary snapping
//! - `legendre`: even Legendre polynomials and quadrature
//! - `figure`: figure functions, multipole kernels, per-level shape solve
//! - `hydrostatic`: pressure, adiabat and cold-start profile
//! - `moments`: J2..J8
//! - `engine`: the inner relaxation loop

pub mod engine;
pub mod error;
pub mod figure;
pub mod grid;
pub mod hydrostatic;
pub mod legendre;
pub mod moments;

pub use engine::{Figure, FigureSolver, FigureTarget, TofOptions};
pub use error::{TofError, TofResult};
pub use figure::{LevelField, LevelKernels, LevelShape};
pub use grid::{GridSpacing, RadialGrid};
pub use moments::GravityMoments;
