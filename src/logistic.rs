//! Transforms between probability space and the additive mixing (logit) space.

use crate::error::{Error, Result};

/// Beyond this the sigmoid is 0 or 1 to f64 precision anyway
const SQUASH_LIMIT: f64 = 64.0;

/// Logit, `ln(p / (1 - p))`. Only defined on the open interval (0, 1).
#[inline(always)]
pub fn stretch(p: f64) -> Result<f64> {
    if p > 0.0 && p < 1.0 {
        Ok((p / (1.0 - p)).ln())
    } else {
        Err(Error::Domain(p))
    }
}

/// Sigmoid, `1 / (1 + e^-x)`. Always finite, NaN maps to 1/2.
#[inline(always)]
pub fn squash(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    let x = x.clamp(-SQUASH_LIMIT, SQUASH_LIMIT);
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::{squash, stretch};
    use crate::error::Error;

    #[test]
    fn stretch_squash_inverse() {
        for &p in &[1e-6, 0.01, 0.25, 0.5, 0.75, 0.99, 1.0 - 1e-6] {
            let x = stretch(p).unwrap();
            assert!((squash(x) - p).abs() < 1e-9, "p = {p}");
        }
        assert_eq!(stretch(0.5).unwrap(), 0.0);
    }

    #[test]
    fn stretch_rejects_bounds() {
        for &p in &[0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(stretch(p), Err(Error::Domain(_))));
        }
    }

    #[test]
    fn squash_extremes_are_finite() {
        for &x in &[f64::INFINITY, f64::NEG_INFINITY, 1e300, -1e300, f64::NAN] {
            let p = squash(x);
            assert!(p.is_finite() && (0.0..=1.0).contains(&p));
        }
        assert!(squash(-1e9) < 1e-20);
        assert!(squash(1e9) > 1.0 - 1e-12);
    }
}
