//! Error control: tolerance scaling and step-size adaptation.

use crate::error::IntegrationError;

/// Tolerances for error control
///
/// A trial step from `y` to `y_new` with error estimate `err` is measured as
/// `max_n |err_n| / (atol_n + rtol_n * max(|y_n|, |y_new_n|))` and accepted
/// when that normalized error is at most `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerances<const N: usize> {
    /// Absolute tolerance per component
    pub atol: [f64; N],
    /// Relative tolerance per component
    pub rtol: [f64; N],
}

impl<const N: usize> Tolerances<N> {
    /// Create tolerances with uniform values
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self {
            atol: [atol; N],
            rtol: [rtol; N],
        }
    }

    /// Create tolerances with per-component values
    pub fn with_components(atol: [f64; N], rtol: [f64; N]) -> Self {
        Self { atol, rtol }
    }

    /// Normalized error of a trial step; the step is acceptable when `<= 1.0`.
    pub fn error_norm(&self, y: &[f64; N], y_new: &[f64; N], err: &[f64; N]) -> f64 {
        let mut max_err: f64 = 0.0;
        for n in 0..N {
            let scale = self.atol[n] + self.rtol[n] * y[n].abs().max(y_new[n].abs());
            max_err = max_err.max(err[n].abs() / scale);
        }
        max_err
    }

    /// Smallest relative tolerance, used to size the event localization tolerance.
    pub fn min_rtol(&self) -> f64 {
        self.rtol.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub(crate) fn validate(&self) -> Result<(), IntegrationError> {
        for (i, (&a, &r)) in self.atol.iter().zip(self.rtol.iter()).enumerate() {
            if !a.is_finite() || a <= 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("atol[{}] must be positive and finite", i),
                });
            }
            if !r.is_finite() || r < 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("rtol[{}] must be non-negative and finite", i),
                });
            }
        }
        Ok(())
    }
}

/// Step-size controller using an I-controller
///
/// h_new = safety * h * error^(-1/(p+1)), where p is the order of the
/// stepper's error estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct StepController {
    /// Safety factor (0.8-0.9 typical)
    pub safety: f64,
    /// Maximum growth factor per step
    pub max_factor: f64,
    /// Minimum reduction factor per step
    pub min_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self::for_order(crate::tableau::EMBEDDED_ORDER)
    }
}

impl StepController {
    /// Controller tuned for an error estimate of order `order`.
    pub fn for_order(order: u8) -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / (f64::from(order) + 1.0),
        }
    }

    /// Step size adjustment factor for a normalized error.
    pub fn factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }

        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }

    pub(crate) fn validate(&self) -> Result<(), IntegrationError> {
        if !self.safety.is_finite() || self.safety <= 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: format!("controller safety factor {} must be positive and finite", self.safety),
            });
        }
        if !self.min_factor.is_finite() || !self.max_factor.is_finite() || self.min_factor <= 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: "controller factors must be positive and finite".to_string(),
            });
        }
        if self.min_factor > self.max_factor {
            return Err(IntegrationError::InvalidInput {
                message: format!(
                    "controller min_factor {} exceeds max_factor {}",
                    self.min_factor, self.max_factor
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_error_norm_uses_larger_magnitude() {
        let tol = Tolerances::<2>::new(1e-10, 1e-6);
        let y = [1.0, -100.0];
        let y_new = [3.0, -10.0];
        let err = [3e-6, 1e-4];

        // component 0: 3e-6 / (1e-10 + 1e-6 * 3)
        // component 1: 1e-4 / (1e-10 + 1e-6 * 100)
        let norm = tol.error_norm(&y, &y_new, &err);
        let expected = (3e-6_f64 / (1e-10 + 3e-6)).max(1e-4 / (1e-10 + 1e-4));
        assert_relative_eq!(norm, expected, max_relative = 1e-14);
        assert!(norm < 1.0);
    }

    #[test]
    fn test_error_norm_ignores_error_sign() {
        let tol = Tolerances::<1>::new(1e-3, 0.0);
        assert_relative_eq!(tol.error_norm(&[0.0], &[0.0], &[-2e-3]), 2.0);
    }

    #[test]
    fn test_validate_rejects_bad_tolerances() {
        assert!(Tolerances::<3>::new(1e-12, 1e-12).validate().is_ok());
        assert!(Tolerances::<3>::new(0.0, 1e-12).validate().is_err());
        assert!(Tolerances::<3>::new(f64::NAN, 1e-12).validate().is_err());
        assert!(Tolerances::<3>::new(1e-12, -1.0).validate().is_err());
        assert!(Tolerances::<3>::new(1e-12, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_min_rtol() {
        let tol = Tolerances::with_components([1e-9; 3], [1e-6, 1e-11, 1e-8]);
        assert_eq!(tol.min_rtol(), 1e-11);
    }

    #[test]
    fn test_controller_factor_bounds() {
        let controller = StepController::for_order(7);

        assert_eq!(controller.factor(0.0), 5.0);
        assert_eq!(controller.factor(1e-30), 5.0);
        assert_eq!(controller.factor(1e30), 0.2);

        // error exactly at tolerance only applies the safety factor
        assert_relative_eq!(controller.factor(1.0), 0.9);

        // 2^-8 under tolerance grows by 0.9 * 2
        assert_relative_eq!(controller.factor(2f64.powi(-8)), 1.8, max_relative = 1e-12);
    }

    #[test]
    fn test_controller_validation() {
        assert!(StepController::default().validate().is_ok());

        let mut controller = StepController::default();
        controller.min_factor = f64::NAN;
        assert!(controller.validate().is_err());

        let mut controller = StepController::default();
        controller.min_factor = 6.0;
        assert!(controller.validate().is_err());

        let mut controller = StepController::default();
        controller.safety = 0.0;
        assert!(controller.validate().is_err());
    }
}
