//! Single-step numerical methods.
//!
//! The integrator treats a [`Stepper`] as opaque: it proposes a step size,
//! receives a trial state with a per-component error estimate, and decides
//! acceptance itself through [`Tolerances`](crate::Tolerances).

use crate::system::OdeSystem;
use crate::tableau::{A, B, B_ERR, C, EMBEDDED_ORDER, STAGES};

/// Outcome of one trial step.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialStep<const N: usize> {
    /// Proposed state at `t + h`
    pub y: [f64; N],
    /// Local error estimate per component
    pub err: [f64; N],
}

/// A method that advances a state by one trial step.
pub trait Stepper<const N: usize> {
    /// Order of the error estimate; sets the controller exponent `1/(order+1)`.
    fn error_order(&self) -> u8;

    /// Derivative evaluations consumed by one call to [`Stepper::step`].
    fn evals_per_step(&self) -> u64;

    /// Whether the integrator should adapt the step size from the error
    /// estimate. Fixed-step methods return `false`; their steps are always
    /// accepted and the step size stays at the caller's initial step.
    fn is_adaptive(&self) -> bool {
        true
    }

    /// Advance `y` at time `t` by one trial step of signed size `h`.
    fn step<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) -> TrialStep<N>;
}

/// Runge-Kutta-Fehlberg 7(8) embedded pair
///
/// Propagates the 8th-order solution and reports the difference to the
/// embedded 7th-order solution as the error estimate. The stage workspace
/// is allocated once and reused across steps.
///
/// # Example
/// ```
/// use event_integrator::{OdeSystem, Rkf78, Stepper};
///
/// struct Decay;
/// impl OdeSystem<1> for Decay {
///     fn rhs(&self, _t: f64, x: &[f64; 1], dxdt: &mut [f64; 1]) {
///         dxdt[0] = -x[0];
///     }
/// }
///
/// let mut rkf = Rkf78::new();
/// let trial = rkf.step(&Decay, 0.0, &[1.0], 0.1);
/// assert!((trial.y[0] - (-0.1f64).exp()).abs() < 1e-14);
/// ```
#[derive(Clone)]
pub struct Rkf78<const N: usize> {
    k: [[f64; N]; STAGES],
}

impl<const N: usize> Default for Rkf78<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Rkf78<N> {
    /// Create a stepper with a zeroed stage workspace.
    pub fn new() -> Self {
        Self {
            k: [[0.0; N]; STAGES],
        }
    }

    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) {
        let mut y_stage = [0.0; N];

        sys.rhs(t, y, &mut self.k[0]);

        for i in 1..STAGES {
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * self.k[j][n];
                }
                y_stage[n] = y[n] + h * sum;
            }
            sys.rhs(t + C[i] * h, &y_stage, &mut self.k[i]);
        }
    }
}

impl<const N: usize> Stepper<N> for Rkf78<N> {
    fn error_order(&self) -> u8 {
        EMBEDDED_ORDER
    }

    fn evals_per_step(&self) -> u64 {
        STAGES as u64
    }

    #[allow(clippy::needless_range_loop)]
    fn step<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) -> TrialStep<N> {
        self.compute_stages(sys, t, y, h);

        let mut y_new = [0.0; N];
        let mut err = [0.0; N];
        for n in 0..N {
            let mut sum = 0.0;
            let mut err_sum = 0.0;
            for i in 0..STAGES {
                sum += B[i] * self.k[i][n];
                err_sum += B_ERR[i] * self.k[i][n];
            }
            y_new[n] = y[n] + h * sum;
            err[n] = h * err_sum;
        }

        TrialStep { y: y_new, err }
    }
}

/// Classical 4th-order Runge-Kutta with a fixed step size.
///
/// Reports a zero error estimate and opts out of adaptation, which makes the
/// sequence of step endpoints fully determined by the initial step. Useful
/// for constructing trajectories whose sample times are known in advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRk4;

impl<const N: usize> Stepper<N> for FixedRk4 {
    fn error_order(&self) -> u8 {
        4
    }

    fn evals_per_step(&self) -> u64 {
        4
    }

    fn is_adaptive(&self) -> bool {
        false
    }

    #[allow(clippy::needless_range_loop)]
    fn step<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) -> TrialStep<N> {
        let mut k1 = [0.0; N];
        let mut k2 = [0.0; N];
        let mut k3 = [0.0; N];
        let mut k4 = [0.0; N];
        let mut tmp = [0.0; N];

        sys.rhs(t, y, &mut k1);
        for n in 0..N {
            tmp[n] = y[n] + 0.5 * h * k1[n];
        }
        sys.rhs(t + 0.5 * h, &tmp, &mut k2);
        for n in 0..N {
            tmp[n] = y[n] + 0.5 * h * k2[n];
        }
        sys.rhs(t + 0.5 * h, &tmp, &mut k3);
        for n in 0..N {
            tmp[n] = y[n] + h * k3[n];
        }
        sys.rhs(t + h, &tmp, &mut k4);

        let mut y_new = [0.0; N];
        for n in 0..N {
            y_new[n] = y[n] + h * ((k1[n] + 2.0 * k2[n] + 2.0 * k3[n] + k4[n]) / 6.0);
        }

        TrialStep {
            y: y_new,
            err: [0.0; N],
        }
    }
}
