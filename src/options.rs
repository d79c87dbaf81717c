//! Integration settings.

use crate::control::Tolerances;
use crate::localize::{Interpolation, LocalizationConfig};

/// Recognized integration options.
///
/// The defaults are tight enough for long CR3BP propagations in
/// nondimensional units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Absolute error floor per state component
    pub abs_tol: f64,
    /// Relative error scaled by the state magnitude
    pub rel_tol: f64,
    /// Signed initial step size; negative for backward integration
    pub initial_step: f64,
    /// Minimum step size
    pub h_min: f64,
    /// Maximum step size
    pub h_max: f64,
    /// Maximum number of step attempts
    pub max_steps: u64,
    /// Event time tolerance; `None` derives it from `rel_tol`
    pub root_tol: Option<f64>,
    /// Maximum root-finding iterations per event
    pub root_max_iter: usize,
    /// Dense output used to localize events
    pub interpolation: Interpolation,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            abs_tol: 1e-16,
            rel_tol: 1e-13,
            initial_step: 1e-10,
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 10_000_000,
            root_tol: None,
            root_max_iter: 100,
            interpolation: Interpolation::Substep,
        }
    }
}

impl Options {
    /// Uniform tolerances for an `N`-component state.
    pub fn tolerances<const N: usize>(&self) -> Tolerances<N> {
        Tolerances::new(self.abs_tol, self.rel_tol)
    }

    /// Localization settings.
    pub fn localization(&self) -> LocalizationConfig {
        LocalizationConfig {
            root_tol: self.root_tol,
            max_iter: self.root_max_iter,
            interpolation: self.interpolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.abs_tol, 1e-16);
        assert_eq!(options.rel_tol, 1e-13);
        assert_eq!(options.initial_step, 1e-10);

        let tol = options.tolerances::<6>();
        assert_eq!(tol.atol, [1e-16; 6]);
        assert_eq!(tol.rtol, [1e-13; 6]);
        assert_eq!(options.localization(), LocalizationConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_document_fills_defaults() {
        let json = r#"{ "rel_tol": 1e-10, "initial_step": -0.01, "interpolation": "hermite" }"#;
        let options: Options = serde_json::from_str(json).unwrap();

        assert_eq!(options.rel_tol, 1e-10);
        assert_eq!(options.initial_step, -0.01);
        assert_eq!(options.interpolation, Interpolation::Hermite);
        assert_eq!(options.abs_tol, 1e-16);
        assert_eq!(options.h_max, f64::INFINITY);
        assert_eq!(options.root_tol, None);
    }
}
