//! Event-aware adaptive integration.
//!
//! [`EventIntegrator`] drives a [`Stepper`] across a [`TimeSpan`], adapting
//! the step size from the stepper's error estimate and monitoring an
//! [`Event`] after every accepted step. Each accepted step goes through
//!
//! 1. a sign-change scan of every event function between the step endpoints,
//! 2. the direction filter and the saturation policy,
//! 3. localization of every surviving crossing,
//! 4. an atomic commit of the localized crossings in travel order, with the
//!    termination flags queried after each simultaneous group.
//!
//! Nothing from a step is committed until all of its crossings have been
//! localized, so a failure mid-step never leaves the event counters partially
//! updated.

use tracing::{debug, trace};

use crate::control::{StepController, Tolerances};
use crate::error::{Failure, IntegrationError};
use crate::events::{detect_crossing, Crossing, Event, EventDirection};
use crate::localize::{localize, order_candidates, DenseStep, LocalizationConfig, StepEnds};
use crate::options::Options;
use crate::root::Brent;
use crate::solution::{Recorder, Solution, Stats, Status};
use crate::span::TimeSpan;
use crate::stepper::Stepper;
use crate::system::OdeSystem;

/// Adaptive integrator with event detection
///
/// # Example
///
/// ```
/// use event_integrator::{AxisCrossing, EventIntegrator, OdeSystem, Rkf78, Status, TimeSpan, Tolerances};
///
/// struct HarmonicOscillator;
/// impl OdeSystem<2> for HarmonicOscillator {
///     fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
///         dydt[0] = y[1];
///         dydt[1] = -y[0];
///     }
/// }
///
/// // stop at the second zero of the position
/// let mut event = AxisCrossing::new(0, 2);
/// let mut integrator = EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-12, 1e-12), 0.1);
/// let span = TimeSpan::new(0.0, 10.0).unwrap();
/// let solution = integrator
///     .integrate_adaptive(&HarmonicOscillator, &mut event, &[1.0, 0.0], span)
///     .unwrap();
///
/// assert_eq!(solution.status, Status::Terminated);
/// assert_eq!(solution.events.len(), 2);
/// assert!((solution.events.t[1] - 1.5 * std::f64::consts::PI).abs() < 1e-10);
/// ```
#[derive(Clone)]
pub struct EventIntegrator<St, const N: usize> {
    stepper: St,
    tol: Tolerances<N>,
    controller: StepController,
    initial_step: f64,
    /// Minimum step size
    pub h_min: f64,
    /// Maximum step size
    pub h_max: f64,
    /// Maximum number of step attempts before error
    pub max_steps: u64,
    localization: LocalizationConfig,
}

impl<St: Stepper<N>, const N: usize> EventIntegrator<St, N> {
    /// Create an integrator.
    ///
    /// `initial_step` is signed and must point along the travel direction of
    /// every span it is used with.
    pub fn new(stepper: St, tol: Tolerances<N>, initial_step: f64) -> Self {
        let controller = StepController::for_order(stepper.error_order());
        Self {
            stepper,
            tol,
            controller,
            initial_step,
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 10_000_000,
            localization: LocalizationConfig::default(),
        }
    }

    /// Create an integrator from a configuration.
    pub fn from_options(stepper: St, options: &Options) -> Self {
        let mut integrator = Self::new(stepper, options.tolerances(), options.initial_step)
            .with_localization(options.localization());
        integrator.set_step_limits(options.h_min, options.h_max);
        integrator.max_steps = options.max_steps;
        integrator
    }

    /// Set minimum and maximum step sizes
    pub fn set_step_limits(&mut self, h_min: f64, h_max: f64) {
        self.h_min = h_min;
        self.h_max = h_max;
    }

    /// Replace the step-size controller.
    pub fn with_controller(mut self, controller: StepController) -> Self {
        self.controller = controller;
        self
    }

    /// Replace the localization settings.
    pub fn with_localization(mut self, localization: LocalizationConfig) -> Self {
        self.localization = localization;
        self
    }

    /// Tolerances in use.
    pub fn tolerances(&self) -> &Tolerances<N> {
        &self.tol
    }

    /// Signed initial step size.
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    /// Integrate `sys` from `x0` across `span`, monitoring `event`.
    ///
    /// Returns at the end of the span ([`Status::Completed`]) or at the first
    /// confirmed occurrence whose termination flags are raised
    /// ([`Status::Terminated`]). The event's occurrence counters are advanced
    /// once per confirmed crossing and can be read afterwards.
    ///
    /// # Errors
    /// Invalid configuration is reported before any stepping with no
    /// partial result. Numerical failures carry everything accumulated up
    /// to that point.
    pub fn integrate_adaptive<S, E>(
        &mut self,
        sys: &S,
        event: &mut E,
        x0: &[f64; N],
        span: TimeSpan,
    ) -> Result<Solution<N>, Failure<N>>
    where
        S: OdeSystem<N>,
        E: Event<N>,
    {
        let _span =
            tracing::debug_span!("integrate_adaptive", start = span.start(), end = span.end())
                .entered();

        self.validate_inputs(x0, span)?;

        let mut recorder = Recorder::new(span.start(), *x0);
        match self.run(sys, event, x0, span, &mut recorder) {
            Ok(status) => {
                let stats = &recorder.stats;
                debug!(
                    ?status,
                    accepted = stats.accepted_steps,
                    rejected = stats.rejected_steps,
                    fn_evals = stats.fn_evals,
                    events = recorder.events.len(),
                    "integration finished"
                );
                Ok(recorder.finish(status))
            }
            Err(error) => {
                debug!(%error, "integration failed");
                Err(Failure {
                    error,
                    partial: Some(recorder.abandon()),
                })
            }
        }
    }

    fn run<S, E>(
        &mut self,
        sys: &S,
        event: &mut E,
        x0: &[f64; N],
        span: TimeSpan,
        recorder: &mut Recorder<N>,
    ) -> Result<Status, IntegrationError>
    where
        S: OdeSystem<N>,
        E: Event<N>,
    {
        let end = span.end();
        let direction = span.direction();
        let n_events = event.occurrences().len();

        let mut directions = vec![EventDirection::Any; n_events];
        event.direction_fcn(&mut directions);

        let mut t = span.start();
        let mut y = *x0;
        let mut h_abs = self.initial_step.abs().clamp(self.h_min, self.h_max);

        let mut g_prev = vec![0.0; n_events];
        let mut g_new = vec![0.0; n_events];
        evaluate_events(&*event, t, &y, &mut g_prev, &mut recorder.stats)?;

        let mut attempts = 0u64;
        loop {
            attempts += 1;
            if attempts > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded {
                    steps: self.max_steps,
                });
            }

            // land exactly on the end of the span
            let last = h_abs >= (end - t).abs();
            let (h, t_new) = if last {
                (end - t, end)
            } else {
                (direction * h_abs, t + direction * h_abs)
            };
            if t_new == t {
                return Err(IntegrationError::StepSizeTooSmall { t, h });
            }

            let trial = self.stepper.step(sys, t, &y, h);
            recorder.stats.fn_evals += self.stepper.evals_per_step();

            if !all_finite(&trial.y) || !all_finite(&trial.err) {
                return Err(IntegrationError::NonFiniteState { t: t_new });
            }

            let mut h_next = h_abs;
            if self.stepper.is_adaptive() {
                let error = self.tol.error_norm(&y, &trial.y, &trial.err);
                let factor = self.controller.factor(error);

                if error > 1.0 {
                    recorder.stats.rejected_steps += 1;
                    trace!(t, h, error, "step rejected");

                    h_abs = h.abs() * factor;
                    if h_abs < self.h_min {
                        return Err(IntegrationError::StepSizeTooSmall {
                            t,
                            h: direction * h_abs,
                        });
                    }
                    continue;
                }

                h_next = (h.abs() * factor).clamp(self.h_min, self.h_max);
            }
            recorder.stats.accepted_steps += 1;

            if n_events > 0 {
                evaluate_events(&*event, t_new, &trial.y, &mut g_new, &mut recorder.stats)?;

                let ends = StepEnds {
                    t_a: t,
                    y_a: &y,
                    t_b: t_new,
                    y_b: &trial.y,
                };
                if let Some((t_event, x_event)) =
                    self.scan_events(sys, event, ends, &g_prev, &g_new, &directions, recorder)?
                {
                    recorder.trajectory.push(t_event, x_event);
                    debug!(t = t_event, "terminated by event");
                    return Ok(Status::Terminated);
                }
                std::mem::swap(&mut g_prev, &mut g_new);
            }

            t = t_new;
            y = trial.y;
            recorder.trajectory.push(t, y);

            if last || span.reached_end(t) {
                return Ok(Status::Completed);
            }
            h_abs = h_next;
        }
    }

    /// Detect, localize and commit the crossings of one accepted step.
    ///
    /// Returns the terminating occurrence, if any.
    #[allow(clippy::too_many_arguments)]
    fn scan_events<S, E>(
        &mut self,
        sys: &S,
        event: &mut E,
        ends: StepEnds<'_, N>,
        g_a: &[f64],
        g_b: &[f64],
        directions: &[EventDirection],
        recorder: &mut Recorder<N>,
    ) -> Result<Option<(f64, [f64; N])>, IntegrationError>
    where
        S: OdeSystem<N>,
        E: Event<N>,
    {
        let mut crossings: Vec<(usize, Crossing)> = Vec::new();
        for (i, (&a, &b)) in g_a.iter().zip(g_b).enumerate() {
            let Some(crossing) = detect_crossing(a, b) else {
                continue;
            };
            if !directions[i].accepts(crossing) {
                continue;
            }
            if !event.occurrences().admits(i) {
                debug!(index = i, t = ends.t_b, "crossing suppressed at saturation");
                continue;
            }
            crossings.push((i, crossing));
        }
        if crossings.is_empty() {
            return Ok(None);
        }

        let tie_tol = self.localization.time_tolerance(&self.tol, ends.t_a, ends.t_b);
        let brent = Brent::new(tie_tol, self.localization.max_iter);
        let dense = DenseStep::new(sys, ends, self.localization.interpolation, &mut recorder.stats);

        let mut candidates = Vec::with_capacity(crossings.len());
        for (index, crossing) in crossings {
            let candidate = localize(
                sys,
                &mut self.stepper,
                &*event,
                &dense,
                index,
                crossing,
                g_a[index],
                g_b[index],
                &brent,
                &mut recorder.stats,
            )?;
            if !all_finite(&candidate.x) {
                return Err(IntegrationError::NonFiniteState { t: candidate.t });
            }
            candidates.push(candidate);
        }

        let travel = (ends.t_b - ends.t_a).signum();
        let mut terminate = vec![false; g_a.len()];
        for group in order_candidates(candidates, travel, tie_tol) {
            for candidate in &group {
                event.occurrences_mut().record(candidate.index);
                recorder.events.push(candidate.t, candidate.x, candidate.index);
                debug!(
                    index = candidate.index,
                    t = candidate.t,
                    crossing = ?candidate.crossing,
                    "event confirmed"
                );
            }

            if let Some(latest) = group.last() {
                event.terminate_fcn(latest.t, &latest.x, &mut terminate);
                if terminate.iter().any(|&flag| flag) {
                    return Ok(Some((latest.t, latest.x)));
                }
            }
        }
        Ok(None)
    }

    fn validate_inputs(&self, x0: &[f64; N], span: TimeSpan) -> Result<(), IntegrationError> {
        self.tol.validate()?;
        self.controller.validate()?;

        let h0 = self.initial_step;
        if !h0.is_finite() || h0 == 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: "initial step must be finite and non-zero".to_string(),
            });
        }
        if h0.signum() != span.direction() {
            return Err(IntegrationError::InvalidInput {
                message: format!(
                    "initial step {} must point along the integration direction ({} -> {})",
                    h0,
                    span.start(),
                    span.end()
                ),
            });
        }
        if !self.h_min.is_finite() || self.h_min < 0.0 || self.h_max.is_nan() || self.h_max <= 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: "h_min must be finite and non-negative, h_max positive".to_string(),
            });
        }
        if self.h_min > self.h_max {
            return Err(IntegrationError::InvalidInput {
                message: format!("h_min {} exceeds h_max {}", self.h_min, self.h_max),
            });
        }
        if let Some(root_tol) = self.localization.root_tol {
            if !root_tol.is_finite() || root_tol < 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: "root tolerance must be finite and non-negative".to_string(),
                });
            }
        }
        if self.localization.max_iter == 0 {
            return Err(IntegrationError::InvalidInput {
                message: "root finding needs at least one iteration".to_string(),
            });
        }
        for (i, &val) in x0.iter().enumerate() {
            if !val.is_finite() {
                return Err(IntegrationError::InvalidInput {
                    message: format!("x0[{}] is not finite", i),
                });
            }
        }
        Ok(())
    }
}

fn evaluate_events<E: Event<N>, const N: usize>(
    event: &E,
    t: f64,
    x: &[f64; N],
    g: &mut [f64],
    stats: &mut Stats,
) -> Result<(), IntegrationError> {
    if g.is_empty() {
        return Ok(());
    }
    event.event_fcn(t, x, g);
    stats.event_evals += 1;
    if !all_finite(g) {
        return Err(IntegrationError::NonFiniteEvent { t });
    }
    Ok(())
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
