//! Scalar update rule for the outer unknowns.
//!
//! Each knob `x` drives one relative residual `r(x)` to zero. The slope
//! `dr/dx` is estimated on the frozen structure of the last figure; once two
//! iterates exist, the secant through them replaces it when both agree in
//! sign. The resulting step is damped and clamped to the knob's interval, so
//! convergence is linear at best and only the sign of the slope is trusted.

use tracing::warn;

/// One knob update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobStep {
    pub value: f64,
    /// Slope the step was taken with
    pub slope: f64,
    /// Step was cut by the trust region or the bounds
    pub clamped: bool,
}

#[derive(Debug, Clone)]
pub struct KnobUpdater {
    name: &'static str,
    bounds: (f64, f64),
    damping: f64,
    max_step: f64,
    last: Option<(f64, f64)>,
}

impl KnobUpdater {
    /// `damping` in (0, 1] scales every Newton-like step; `max_step` caps its size.
    pub fn new(name: &'static str, bounds: (f64, f64), damping: f64, max_step: f64) -> Self {
        Self {
            name,
            bounds,
            damping,
            max_step,
            last: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Next value of the knob at `x` with residual `residual`.
    pub fn step(&mut self, x: f64, residual: f64, frozen_slope: f64) -> KnobStep {
        let mut slope = frozen_slope;
        if let Some((x0, r0)) = self.last
            && x != x0
        {
            let secant = (residual - r0) / (x - x0);
            if secant.is_finite() && secant != 0.0 && secant.signum() == frozen_slope.signum() {
                slope = secant;
            }
        }
        self.last = Some((x, residual));

        if !(slope.is_finite() && slope != 0.0) {
            warn!(knob = self.name, slope, "no usable sensitivity; knob held");
            return KnobStep {
                value: x,
                slope,
                clamped: true,
            };
        }

        let raw = -self.damping * residual / slope;
        let mut clamped = false;
        let mut dx = raw;
        if dx.abs() > self.max_step {
            dx = self.max_step.copysign(dx);
            clamped = true;
        }
        let (lo, hi) = self.bounds;
        let mut value = x + dx;
        if value < lo || value > hi {
            value = value.clamp(lo, hi);
            clamped = true;
        }
        if clamped {
            warn!(knob = self.name, x, raw_step = raw, value, "knob update clamped");
        }
        KnobStep {
            value,
            slope,
            clamped,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn damped_iteration_converges_on_monotone_residual(
            root in 0.05_f64..0.95,
            gain in 0.2_f64..5.0,
            curvature in 0.0_f64..1.0,
            start in 0.0_f64..1.0,
        ) {
            let r = |x: f64| gain * (x - root) + curvature * (x - root).powi(3);
            let mut k = KnobUpdater::new("z", (0.0, 1.0), 0.8, 0.2);
            let mut x = start;
            for _ in 0..200 {
                x = k.step(x, r(x), gain).value;
            }
            prop_assert!((x - root).abs() < 1e-6);
        }
    }
}
