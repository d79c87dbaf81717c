//! Errors that can occur during integration

use thiserror::Error;

use crate::root::BrentError;
use crate::solution::Partial;

/// Why an integration could not produce a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// Invalid input parameters, detected before any stepping.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },

    /// The step size shrank below the minimum without meeting the tolerance.
    #[error("step size {h} too small at t = {t}")]
    StepSizeTooSmall {
        /// Time at which the step size became too small
        t: f64,
        /// Step size that was too small
        h: f64,
    },

    /// Maximum number of integration steps exceeded.
    #[error("maximum number of integration steps ({steps}) exceeded")]
    MaxStepsExceeded {
        /// Step limit that was hit
        steps: u64,
    },

    /// A trial step produced a non-finite state or error estimate.
    #[error("non-finite state detected at t = {t}")]
    NonFiniteState {
        /// End time of the offending trial step
        t: f64,
    },

    /// An event function returned a non-finite value.
    #[error("non-finite event function value at t = {t}")]
    NonFiniteEvent {
        /// Time of the evaluation
        t: f64,
    },

    /// Root finding could not pin down a detected crossing.
    #[error("localization of event {index} in [{t_a}, {t_b}] failed")]
    LocalizationFailed {
        /// Event function whose crossing was being localized
        index: usize,
        /// Start of the accepted step
        t_a: f64,
        /// End of the accepted step
        t_b: f64,
        /// Root finder failure
        #[source]
        source: BrentError,
    },
}

/// A failed integration.
///
/// `partial` is `None` when the inputs were rejected before stepping, and
/// holds everything accumulated up to the failure otherwise.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("integration failed: {error}")]
pub struct Failure<const N: usize> {
    /// What went wrong
    pub error: IntegrationError,
    /// Results accumulated before the failure
    pub partial: Option<Partial<N>>,
}

impl<const N: usize> From<IntegrationError> for Failure<N> {
    fn from(error: IntegrationError) -> Self {
        Self {
            error,
            partial: None,
        }
    }
}
