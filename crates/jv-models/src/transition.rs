//! Composition transitions between adjacent layers.

use serde::{Deserialize, Serialize};

/// Steepness of the sigmoid across a unit band.
const SIGMOID_STEEPNESS: f64 = 10.0;

/// How composition varies inside a transition band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientShape {
    Linear,
    #[default]
    Sigmoid,
}

impl GradientShape {
    /// Outer-layer weight at normalised band position `x`.
    ///
    /// 0 at and below x = 0, 1 at and above x = 1, monotone in between.
    pub fn weight(self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => x,
            Self::Sigmoid => {
                let logistic = |t: f64| 1.0 / (1.0 + (-SIGMOID_STEEPNESS * (t - 0.5)).exp());
                let (lo, hi) = (logistic(0.0), logistic(1.0));
                (logistic(x) - lo) / (hi - lo)
            }
        }
    }
}

/// A band `[inner, outer]` in normalised mean radius.
///
/// A zero-width band is a jump; the point at the jump belongs to the inner layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub inner: f64,
    pub outer: f64,
    pub shape: GradientShape,
}

impl Transition {
    pub fn jump(at: f64) -> Self {
        Self {
            inner: at,
            outer: at,
            shape: GradientShape::Linear,
        }
    }

    pub fn is_jump(&self) -> bool {
        self.outer <= self.inner
    }

    /// Weight of the outer layer at `lambda`.
    pub fn outer_weight(&self, lambda: f64) -> f64 {
        if self.is_jump() {
            return if lambda <= self.inner { 0.0 } else { 1.0 };
        }
        self.shape
            .weight((lambda - self.inner) / (self.outer - self.inner))
    }

    /// Blend of the two layer values at `lambda`.
    pub fn value(&self, lambda: f64, inside: f64, outside: f64) -> f64 {
        let w = self.outer_weight(lambda);
        if w == 0.0 {
            inside
        } else if w == 1.0 {
            outside
        } else {
            inside + w * (outside - inside)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_edges_are_exact() {
        assert_eq!(GradientShape::Sigmoid.weight(0.0), 0.0);
        assert_eq!(GradientShape::Sigmoid.weight(1.0), 1.0);
        assert!((GradientShape::Sigmoid.weight(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn band_takes_adjacent_values_outside() {
        let t = Transition {
            inner: 0.3,
            outer: 0.4,
            shape: GradientShape::Sigmoid,
        };
        assert_eq!(t.value(0.2, 0.1, 0.9), 0.1);
        assert_eq!(t.value(0.3, 0.1, 0.9), 0.1);
        assert_eq!(t.value(0.4, 0.1, 0.9), 0.9);
        assert_eq!(t.value(0.95, 0.1, 0.9), 0.9);
    }

    #[test]
    fn jump_boundary_point_is_inner() {
        let t = Transition::jump(0.5);
        assert_eq!(t.value(0.5, 1.0, 2.0), 1.0);
        assert_eq!(t.value(0.500001, 1.0, 2.0), 2.0);
        assert!(t.is_jump());
    }

    #[test]
    fn shape_parses_lowercase() {
        let s: GradientShape = serde_yaml::from_str("linear").unwrap();
        assert_eq!(s, GradientShape::Linear);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sigmoid_is_monotone(a in 0.0_f64..1.0, b in 0.0_f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let shape = GradientShape::Sigmoid;
            prop_assert!(shape.weight(lo) <= shape.weight(hi));
        }

        #[test]
        fn sigmoid_is_continuous(x in 0.0_f64..1.0) {
            let shape = GradientShape::Sigmoid;
            let h = 1e-7;
            // Max slope of the normalised logistic is k/4 / (hi - lo) < 2.6
            prop_assert!((shape.weight(x + h) - shape.weight(x)).abs() < 3.0 * h);
        }

        #[test]
        fn blended_value_stays_between_layers(
            lambda in 0.0_f64..1.0,
            inside in 0.0_f64..1.0,
            outside in 0.0_f64..1.0,
        ) {
            let t = Transition { inner: 0.4, outer: 0.6, shape: GradientShape::Sigmoid };
            let v = t.value(lambda, inside, outside);
            prop_assert!(v >= inside.min(outside) - 1e-15);
            prop_assert!(v <= inside.max(outside) + 1e-15);
        }
    }
}
