//! Plane-crossing propagation with runtime-sized inputs.
//!
//! [`propagate`] takes plain slices, picks the 6- or 42-component form of the
//! CR3BP from the length of the initial state, and integrates with RKF7(8)
//! until the requested number of XZ-plane crossings has been confirmed or
//! the time span ends. Results come back as one row per sample.

use thiserror::Error;

use crate::cr3bp::{Cr3bp, STATE_DIM, STM_STATE_DIM};
use crate::error::IntegrationError;
use crate::events::{AxisCrossing, Event};
use crate::integrator::EventIntegrator;
use crate::options::Options;
use crate::solution::{EventTrajectory, Partial, Solution, Stats, Status, Trajectory};
use crate::span::TimeSpan;
use crate::stepper::Rkf78;
use crate::system::OdeSystem;

/// Outputs of a successful propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct Propagation {
    /// Sample times
    pub t: Vec<f64>,
    /// State rows at `t`
    pub x: Vec<Vec<f64>>,
    /// Event times
    pub te: Vec<f64>,
    /// State rows at `te`
    pub xe: Vec<Vec<f64>>,
    /// Event function index per event; always `0` for the plane crossing
    pub ie: Vec<usize>,
    /// How the propagation ended
    pub status: Status,
    /// Confirmed crossings
    pub crossings: u32,
    /// Work counters
    pub stats: Stats,
}

/// Rows accumulated before a propagation failed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialPropagation {
    /// Sample times
    pub t: Vec<f64>,
    /// State rows at `t`
    pub x: Vec<Vec<f64>>,
    /// Event times
    pub te: Vec<f64>,
    /// State rows at `te`
    pub xe: Vec<Vec<f64>>,
    /// Event function index per event
    pub ie: Vec<usize>,
    /// Work counters
    pub stats: Stats,
}

/// A failed propagation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("propagation failed: {error}")]
pub struct PropagateFailure {
    /// What went wrong
    pub error: IntegrationError,
    /// Results accumulated before the failure; `None` for invalid inputs
    pub partial: Option<PartialPropagation>,
}

impl From<IntegrationError> for PropagateFailure {
    fn from(error: IntegrationError) -> Self {
        Self {
            error,
            partial: None,
        }
    }
}

/// Propagate `x0` in the CR3BP with mass parameter `mu` across `tspan`,
/// stopping after `n_cross` crossings of the XZ plane.
///
/// `x0` has 6 components, or 42 with the state-transition matrix appended
/// row-major. Only the first and last entries of `tspan` bound the window.
/// Integrating backward needs a negative `options.initial_step`.
///
/// # Example
///
/// ```
/// use event_integrator::{propagate, Options, Status};
///
/// let mu = 0.0121505856;
/// let r: f64 = 0.2;
/// let vy = r * (((1.0 - mu) / r.powi(3)).sqrt() - 1.0);
/// let x0 = [r - mu, 0.0, 0.0, 0.0, vy, 0.0];
///
/// let options = Options { abs_tol: 1e-12, rel_tol: 1e-12, initial_step: 1e-3, ..Default::default() };
/// let result = propagate(&x0, &[0.0, 10.0], mu, 2, &options).unwrap();
///
/// assert_eq!(result.status, Status::Terminated);
/// assert_eq!(result.te.len(), 2);
/// assert!(result.xe[1][1].abs() < 1e-10);
/// ```
///
/// # Errors
/// Invalid inputs are reported with no partial result. Numerical failures
/// carry the rows accumulated so far.
pub fn propagate(
    x0: &[f64],
    tspan: &[f64],
    mu: f64,
    n_cross: u32,
    options: &Options,
) -> Result<Propagation, PropagateFailure> {
    let span = TimeSpan::from_markers(tspan)?;
    if !mu.is_finite() || !(0.0..=1.0).contains(&mu) {
        return Err(IntegrationError::InvalidInput {
            message: format!("mass parameter {} must lie in [0, 1]", mu),
        }
        .into());
    }

    let sys = Cr3bp::new(mu);
    match x0.len() {
        STATE_DIM => propagate_fixed::<STATE_DIM>(&sys, x0, span, n_cross, options),
        STM_STATE_DIM => propagate_fixed::<STM_STATE_DIM>(&sys, x0, span, n_cross, options),
        n => Err(IntegrationError::InvalidInput {
            message: format!(
                "initial state must have {} or {} components, got {}",
                STATE_DIM, STM_STATE_DIM, n
            ),
        }
        .into()),
    }
}

fn propagate_fixed<const N: usize>(
    sys: &Cr3bp,
    x0: &[f64],
    span: TimeSpan,
    n_cross: u32,
    options: &Options,
) -> Result<Propagation, PropagateFailure>
where
    Cr3bp: OdeSystem<N>,
{
    let x0 = <[f64; N]>::try_from(x0).map_err(|_| IntegrationError::InvalidInput {
        message: format!("initial state must have {} components", N),
    })?;

    let mut event = AxisCrossing::xz_plane(n_cross);
    let mut integrator = EventIntegrator::from_options(Rkf78::new(), options);

    match integrator.integrate_adaptive(sys, &mut event, &x0, span) {
        Ok(solution) => {
            let crossings = Event::<N>::occurrences(&event).current()[0];
            Ok(Propagation::new(solution, crossings))
        }
        Err(failure) => Err(PropagateFailure {
            error: failure.error,
            partial: failure.partial.map(PartialPropagation::from),
        }),
    }
}

fn rows<const N: usize>(states: Vec<[f64; N]>) -> Vec<Vec<f64>> {
    states.into_iter().map(|x| x.to_vec()).collect()
}

impl Propagation {
    fn new<const N: usize>(solution: Solution<N>, crossings: u32) -> Self {
        let Solution {
            status,
            trajectory: Trajectory { t, x },
            events,
            stats,
        } = solution;
        let EventTrajectory { t: te, x: xe, index: ie } = events;
        Self {
            t,
            x: rows(x),
            te,
            xe: rows(xe),
            ie,
            status,
            crossings,
            stats,
        }
    }
}

impl<const N: usize> From<Partial<N>> for PartialPropagation {
    fn from(partial: Partial<N>) -> Self {
        let Partial {
            trajectory: Trajectory { t, x },
            events: EventTrajectory { t: te, x: xe, index: ie },
            stats,
        } = partial;
        Self {
            t,
            x: rows(x),
            te,
            xe: rows(xe),
            ie,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU: f64 = 0.0121505856;

    fn leo_like() -> [f64; 6] {
        let r: f64 = 0.2;
        [r - MU, 0.0, 0.0, 0.0, r * (((1.0 - MU) / r.powi(3)).sqrt() - 1.0), 0.0]
    }

    fn test_options() -> Options {
        Options {
            abs_tol: 1e-12,
            rel_tol: 1e-12,
            initial_step: 1e-3,
            ..Default::default()
        }
    }

    fn assert_invalid(result: Result<Propagation, PropagateFailure>) {
        match result {
            Err(PropagateFailure {
                error: IntegrationError::InvalidInput { message },
                partial: None,
            }) => println!("rejected: {}", message),
            other => panic!("expected an invalid input failure, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_state_length() {
        assert_invalid(propagate(&[0.0; 5], &[0.0, 1.0], MU, 1, &test_options()));
        assert_invalid(propagate(&[0.0; 7], &[0.0, 1.0], MU, 1, &test_options()));
        assert_invalid(propagate(&[], &[0.0, 1.0], MU, 1, &test_options()));
    }

    #[test]
    fn test_rejects_bad_time_markers_and_mu() {
        let x0 = leo_like();
        assert_invalid(propagate(&x0, &[0.0], MU, 1, &test_options()));
        assert_invalid(propagate(&x0, &[1.0, 2.0, 1.0], MU, 1, &test_options()));
        assert_invalid(propagate(&x0, &[0.0, f64::NAN], MU, 1, &test_options()));
        assert_invalid(propagate(&x0, &[0.0, 1.0], -0.1, 1, &test_options()));
        assert_invalid(propagate(&x0, &[0.0, 1.0], f64::NAN, 1, &test_options()));
    }

    #[test]
    fn test_backward_needs_negative_initial_step() {
        let x0 = leo_like();
        assert_invalid(propagate(&x0, &[0.0, -1.0], MU, 2, &test_options()));

        let options = Options {
            initial_step: -1e-3,
            ..test_options()
        };
        let result = propagate(&x0, &[0.0, -1.0], MU, 2, &options).unwrap();
        assert_eq!(result.status, Status::Terminated);
        assert_eq!(result.te.len(), 2);
        assert!(result.te.iter().all(|&t| t < 0.0));
    }

    #[test]
    fn test_plane_crossings_rows() {
        let result = propagate(&leo_like(), &[0.0, 10.0], MU, 3, &test_options()).unwrap();

        assert_eq!(result.status, Status::Terminated);
        assert_eq!(result.crossings, 3);
        assert_eq!(result.te.len(), 3);
        assert_eq!(result.ie, vec![0, 0, 0]);
        assert_eq!(result.t.len(), result.x.len());
        assert!(result.x.iter().all(|row| row.len() == 6));
        for xe in &result.xe {
            assert!(xe[1].abs() < 1e-10);
        }
        assert_eq!(result.t.last(), result.te.last());
        println!("crossings at {:?}", result.te);
    }

    #[test]
    fn test_stm_rows_have_42_components() {
        let x0 = Cr3bp::augment(&leo_like());
        let result = propagate(&x0, &[0.0, 10.0], MU, 1, &test_options()).unwrap();

        assert_eq!(result.te.len(), 1);
        assert!(result.x.iter().all(|row| row.len() == 42));
        assert_eq!(result.xe[0].len(), 42);

        // the first row is the identity STM passed in
        assert_eq!(result.x[0][6], 1.0);
        assert_eq!(result.x[0][7], 0.0);
    }

    #[test]
    fn test_numerical_failure_keeps_rows() {
        // start on top of the larger primary
        let x0 = [-MU, 0.0, 0.0, 0.0, 0.0, 0.0];
        match propagate(&x0, &[0.0, 1.0], MU, 1, &test_options()) {
            Err(PropagateFailure {
                error: IntegrationError::NonFiniteState { .. },
                partial: Some(partial),
            }) => assert_eq!(partial.t, vec![0.0]),
            other => panic!("expected a non-finite state failure, got {:?}", other),
        }
    }
}
