//! Radial grid in normalised mean radius.
//!
//! Level 0 is the innermost level surface, level `nz - 1` the surface at
//! lambda = 1. Shell `j` lies between levels `j - 1` and `j`; shell 0 is the
//! central ball inside level 0.

use crate::error::{TofError, TofResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Point distribution of the levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridSpacing {
    /// Equal steps in lambda.
    Linear,
    /// Steps shrinking geometrically outward; `ratio` = innermost / outermost step.
    Geometric { ratio: f64 },
    /// Chebyshev-Gauss-Lobatto points, clustered at centre and surface.
    GaussLobatto,
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self::Geometric { ratio: 4.0 }
    }
}

impl GridSpacing {
    /// Unsnapped levels, strictly increasing, last = 1.
    pub fn levels(self, nz: usize) -> TofResult<Vec<f64>> {
        if nz < 8 {
            return Err(TofError::Grid {
                what: format!("need at least 8 levels, got {nz}"),
            });
        }
        let n = nz as f64;
        let mut lambda: Vec<f64> = match self {
            Self::Linear => (1..=nz).map(|j| j as f64 / n).collect(),
            Self::Geometric { ratio } => {
                if !(ratio > 0.0 && ratio.is_finite()) {
                    return Err(TofError::Grid {
                        what: format!("geometric ratio must be positive, got {ratio}"),
                    });
                }
                let q = ratio.powf(-1.0 / (n - 1.0));
                let steps: Vec<f64> = (0..nz).map(|i| q.powi(i as i32)).collect();
                let total: f64 = steps.iter().sum();
                let mut acc = 0.0;
                steps
                    .iter()
                    .map(|d| {
                        acc += d / total;
                        acc
                    })
                    .collect()
            }
            Self::GaussLobatto => (1..=nz)
                .map(|j| 0.5 * (1.0 - (PI * j as f64 / n).cos()))
                .collect(),
        };
        lambda[nz - 1] = 1.0;
        Ok(lambda)
    }
}

/// Level radii plus the shells that straddle a composition jump.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGrid {
    lambda: Vec<f64>,
    /// `jump_below[j]`: shell j has a discontinuity at its inner edge
    jump_below: Vec<bool>,
}

impl RadialGrid {
    /// Build levels and move the nearest interior level onto every alignment radius.
    pub fn build(
        nz: usize,
        spacing: GridSpacing,
        alignment: &[f64],
        discontinuities: &[f64],
    ) -> TofResult<Self> {
        let mut lambda = spacing.levels(nz)?;
        let mut snapped: Vec<usize> = Vec::with_capacity(alignment.len());
        for &b in alignment {
            if !(b > 0.0 && b < 1.0) {
                return Err(TofError::Grid {
                    what: format!("alignment radius {b} outside (0, 1)"),
                });
            }
            let idx = nearest_interior(&lambda, b);
            if snapped.contains(&idx) {
                return Err(TofError::Grid {
                    what: format!("boundary {b} shares level {idx} with another boundary"),
                });
            }
            snapped.push(idx);
            lambda[idx] = b;
        }
        if let Some(w) = lambda.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TofError::Grid {
                what: format!(
                    "levels {} and {} collide after snapping to boundaries",
                    w,
                    w + 1
                ),
            });
        }

        let mut jump_below = vec![false; nz];
        for &b in discontinuities {
            // Inner edge lambda[s - 1] <= b < lambda[s]
            let s = lambda.partition_point(|&l| l <= b);
            if s >= 1 && s < nz {
                jump_below[s] = true;
            }
        }
        Ok(Self { lambda, jump_below })
    }

    pub fn len(&self) -> usize {
        self.lambda.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lambda.is_empty()
    }

    pub fn lambda(&self) -> &[f64] {
        &self.lambda
    }

    pub fn jump_below(&self) -> &[bool] {
        &self.jump_below
    }

    /// Shell values from level values: the mean of the two bounding levels,
    /// or the outer level where the shell sits just outside a jump.
    pub fn shell_values(&self, level: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(level.len());
        out.push(level[0]);
        for j in 1..level.len() {
            if self.jump_below[j] {
                out.push(level[j]);
            } else {
                out.push(0.5 * (level[j - 1] + level[j]));
            }
        }
        out
    }

    /// Smallest spacing between adjacent levels.
    pub fn min_spacing(&self) -> f64 {
        self.lambda
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min)
    }
}

fn nearest_interior(lambda: &[f64], b: f64) -> usize {
    let n = lambda.len();
    let hi = lambda.partition_point(|&l| l < b).min(n - 2);
    if hi == 0 {
        return 0;
    }
    if (lambda[hi] - b).abs() < (b - lambda[hi - 1]).abs() {
        hi
    } else {
        hi - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn increasing(l: &[f64]) -> bool {
        l.windows(2).all(|w| w[1] > w[0])
    }

    #[test]
    fn spacings_end_at_surface() {
        for spacing in [
            GridSpacing::Linear,
            GridSpacing::Geometric { ratio: 4.0 },
            GridSpacing::GaussLobatto,
        ] {
            let l = spacing.levels(64).unwrap();
            assert_eq!(l.len(), 64);
            assert_eq!(l[63], 1.0);
            assert!(l[0] > 0.0);
            assert!(increasing(&l), "{spacing:?}");
        }
    }

    #[test]
    fn geometric_refines_outward() {
        let l = GridSpacing::Geometric { ratio: 4.0 }.levels(100).unwrap();
        let inner = l[0];
        let outer = l[99] - l[98];
        assert!((inner / outer - 4.0).abs() < 1e-9);
    }

    #[test]
    fn boundaries_are_snapped() {
        let g = RadialGrid::build(128, GridSpacing::Linear, &[0.1234, 0.8], &[0.1234, 0.8])
            .unwrap();
        assert!(g.lambda().contains(&0.1234));
        assert!(g.lambda().contains(&0.8));
        let s = g.lambda().iter().position(|&l| l == 0.1234).unwrap() + 1;
        assert!(g.jump_below()[s]);
        assert_eq!(g.jump_below().iter().filter(|&&j| j).count(), 2);
    }

    #[test]
    fn shell_values_respect_jumps() {
        let g = RadialGrid::build(16, GridSpacing::Linear, &[0.5], &[0.5]).unwrap();
        let levels: Vec<f64> = g
            .lambda()
            .iter()
            .map(|&l| if l <= 0.5 { 5.0 } else { 1.0 })
            .collect();
        let shells = g.shell_values(&levels);
        let s = g.lambda().iter().position(|&l| l == 0.5).unwrap();
        assert_eq!(shells[s], 5.0);
        assert_eq!(shells[s + 1], 1.0);
        assert_eq!(shells[1], 5.0);
    }

    #[test]
    fn colliding_boundaries_rejected() {
        let err = RadialGrid::build(16, GridSpacing::Linear, &[0.5, 0.501], &[]).unwrap_err();
        assert!(matches!(err, TofError::Grid { .. }));
    }

    #[test]
    fn too_few_levels_rejected() {
        assert!(GridSpacing::Linear.levels(4).is_err());
    }
}
