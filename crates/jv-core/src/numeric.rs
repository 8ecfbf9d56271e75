use crate::JvError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, JvError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(JvError::NonFinite { what, value: v })
    }
}

/// Check every element of a slice, reporting the first offender.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), JvError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(JvError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Relative change |new - old| / max(|new|, floor).
///
/// The floor keeps quantities that are legitimately zero (J2n of a
/// non-rotating body) from producing a spurious large residual.
pub fn relative_change(new: Real, old: Real, floor: Real) -> Real {
    (new - old).abs() / new.abs().max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_reports_offender() {
        assert!(ensure_all_finite(&[1.0, 2.0], "rho").is_ok());
        let err = ensure_all_finite(&[1.0, Real::INFINITY, Real::NAN], "rho").unwrap_err();
        assert_eq!(
            err,
            JvError::NonFinite {
                what: "rho",
                value: Real::INFINITY
            }
        );
    }

    #[test]
    fn relative_change_uses_floor() {
        assert!((relative_change(2.0, 1.0, 1e-9) - 0.5).abs() < 1e-15);
        assert!(relative_change(1e-17, 0.0, 1e-9) < 1e-7);
    }
}
