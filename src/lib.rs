//! # Event-aware RKF7(8) integration
//!
//! An adaptive ODE integrator that monitors user-defined event functions
//! while it steps, localizes their zero crossings inside accepted steps and
//! stops when an event asks it to. Built for trajectory work in the circular
//! restricted three-body problem (CR3BP), with and without the
//! state-transition matrix.
//!
//! ## Features
//!
//! - 13-stage embedded RK7(8) pair propagating the 8th-order solution
//! - Adaptive step-size control from the 7th-order error estimate
//! - Pluggable [`Stepper`]s, including a fixed-step RK4 for deterministic runs
//! - Multiple event functions per [`Event`], each with a direction filter and
//!   an occurrence counter
//! - Crossings localized with Brent's method on dense output of the step
//! - Direction-aware forward and backward integration
//! - CR3BP dynamics in 6- and 42-component (variational) form
//!
//! ## Basic Usage
//!
//! ```rust
//! use event_integrator::{EventIntegrator, NoEvent, OdeSystem, Rkf78, TimeSpan, Tolerances};
//!
//! struct HarmonicOscillator { omega: f64 }
//!
//! impl OdeSystem<2> for HarmonicOscillator {
//!     fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
//!         dydt[0] = y[1];
//!         dydt[1] = -self.omega * self.omega * y[0];
//!     }
//! }
//!
//! let sys = HarmonicOscillator { omega: 1.0 };
//! let mut integrator = EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-12, 1e-12), 0.1);
//! let span = TimeSpan::new(0.0, 10.0).unwrap();
//!
//! let solution = integrator.integrate_adaptive(&sys, &mut NoEvent::default(), &[1.0, 0.0], span).unwrap();
//! let (tf, yf) = solution.trajectory.last().unwrap();
//! assert_eq!(tf, 10.0);
//! assert!((yf[0] - 10f64.cos()).abs() < 1e-9);
//! ```
//!
//! ## Events
//!
//! An [`Event`] evaluates any number of scalar functions `g_i(t, x)`. After
//! every accepted step the integrator looks for sign changes, applies each
//! function's [`EventDirection`] filter, localizes the surviving crossings
//! and commits them in travel order. Termination is decided by the event
//! itself through [`Event::terminate_fcn`]; the default stops once a
//! function's occurrence counter reaches its maximum.
//!
//! ```rust
//! use event_integrator::{propagate, Options, Status};
//!
//! // low orbit about the larger Earth-Moon primary, stop at the 4th XZ crossing
//! let mu = 0.0121505856;
//! let x0 = [0.2 - mu, 0.0, 0.0, 0.0, 0.2 * (((1.0 - mu) / 0.008f64).sqrt() - 1.0), 0.0];
//! let options = Options { abs_tol: 1e-12, rel_tol: 1e-12, initial_step: 1e-3, ..Default::default() };
//!
//! let result = propagate(&x0, &[0.0, 10.0], mu, 4, &options).unwrap();
//! assert_eq!(result.status, Status::Terminated);
//! assert_eq!(result.te.len(), 4);
//! assert_eq!(result.t.last(), result.te.last());
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber. Rejected
//! steps are logged at `trace`, confirmed events and the final outcome at
//! `debug`.
//!
//! ## References
//!
//! 1. Fehlberg, E. (1968). "Classical Fifth-, Sixth-, Seventh-, and
//!    Eighth-Order Runge-Kutta Formulas with Stepsize Control".
//!    NASA TR R-287.
//!
//! 2. Hairer, E., Nørsett, S.P., & Wanner, G. (1993). "Solving
//!    Ordinary Differential Equations I: Nonstiff Problems".
//!    Springer.
//!
//! 3. Brent, R.P. (1973). "Algorithms for Minimization without
//!    Derivatives". Prentice-Hall.
//!
//! 4. Szebehely, V. (1967). "Theory of Orbits: The Restricted Problem of
//!    Three Bodies". Academic Press.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod control;
pub mod cr3bp;
pub mod error;
pub mod events;
pub mod integrator;
pub mod localize;
pub mod options;
pub mod propagate;
pub mod root;
pub mod solution;
pub mod span;
pub mod stepper;
pub mod system;
pub mod tableau;

pub use control::{StepController, Tolerances};
pub use cr3bp::Cr3bp;
pub use error::{Failure, IntegrationError};
pub use events::{
    detect_crossing, AxisCrossing, Crossing, Event, EventDirection, NoEvent, Occurrences,
    Saturation,
};
pub use integrator::EventIntegrator;
pub use localize::{Interpolation, LocalizationConfig};
pub use options::Options;
pub use propagate::{propagate, PartialPropagation, PropagateFailure, Propagation};
pub use root::{Brent, BrentError, Root};
pub use solution::{EventTrajectory, Partial, Solution, Stats, Status, Trajectory};
pub use span::TimeSpan;
pub use stepper::{FixedRk4, Rkf78, Stepper, TrialStep};
pub use system::OdeSystem;
