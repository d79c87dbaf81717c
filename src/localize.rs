//! Event localization inside an accepted step.
//!
//! Once a sign change of `g_i` has been observed between the endpoints of an
//! accepted step, the crossing time is found with [`Brent`] on
//! `t -> g_i(t, x(t))`, where `x(t)` comes from dense output of the step.

use crate::control::Tolerances;
use crate::error::IntegrationError;
use crate::events::{Crossing, Event};
use crate::root::Brent;
use crate::solution::Stats;
use crate::stepper::Stepper;
use crate::system::OdeSystem;

/// Dense output used to evaluate the state inside an accepted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interpolation {
    /// Re-take a stepper sub-step from the start of the accepted step.
    /// Accurate to the stepper's own order; costs one step per evaluation.
    #[default]
    Substep,
    /// Cubic Hermite interpolant through both endpoints and their
    /// derivatives. O(h⁴) state accuracy; two derivative evaluations per
    /// localized step.
    Hermite,
}

/// Settings for event localization
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationConfig {
    /// Tolerance on the crossing time. `None` derives it from the smallest
    /// relative tolerance and the step length.
    pub root_tol: Option<f64>,
    /// Maximum root-finding iterations before localization fails.
    pub max_iter: usize,
    /// Dense output used during root finding.
    pub interpolation: Interpolation,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            root_tol: None,
            max_iter: 100,
            interpolation: Interpolation::Substep,
        }
    }
}

impl LocalizationConfig {
    /// Time tolerance for a step from `t_a` to `t_b`.
    ///
    /// Never below a few ulps of the step's times, so the bracket can
    /// always shrink far enough to converge.
    pub fn time_tolerance<const N: usize>(&self, tol: &Tolerances<N>, t_a: f64, t_b: f64) -> f64 {
        let floor = 4.0 * f64::EPSILON * t_a.abs().max(t_b.abs());
        let tol = self
            .root_tol
            .unwrap_or_else(|| tol.min_rtol() * (t_b - t_a).abs());
        tol.max(floor)
    }
}

/// One accepted step, from `(t_a, y_a)` to `(t_b, y_b)`.
#[derive(Clone, Copy)]
pub(crate) struct StepEnds<'a, const N: usize> {
    pub t_a: f64,
    pub y_a: &'a [f64; N],
    pub t_b: f64,
    pub y_b: &'a [f64; N],
}

enum Dense<const N: usize> {
    Substep,
    Hermite { f_a: [f64; N], f_b: [f64; N] },
}

/// State evaluation anywhere inside an accepted step.
pub(crate) struct DenseStep<'a, const N: usize> {
    ends: StepEnds<'a, N>,
    dense: Dense<N>,
}

impl<'a, const N: usize> DenseStep<'a, N> {
    pub fn new<S: OdeSystem<N>>(
        sys: &S,
        ends: StepEnds<'a, N>,
        interpolation: Interpolation,
        stats: &mut Stats,
    ) -> Self {
        let dense = match interpolation {
            Interpolation::Substep => Dense::Substep,
            Interpolation::Hermite => {
                let mut f_a = [0.0; N];
                let mut f_b = [0.0; N];
                sys.rhs(ends.t_a, ends.y_a, &mut f_a);
                sys.rhs(ends.t_b, ends.y_b, &mut f_b);
                stats.fn_evals += 2;
                Dense::Hermite { f_a, f_b }
            }
        };
        Self { ends, dense }
    }

    /// State at `t`; the endpoints return the accepted states exactly.
    pub fn state_at<S, St>(&self, stepper: &mut St, sys: &S, t: f64, stats: &mut Stats) -> [f64; N]
    where
        S: OdeSystem<N>,
        St: Stepper<N>,
    {
        let StepEnds { t_a, y_a, t_b, y_b } = self.ends;
        if t == t_a {
            return *y_a;
        }
        if t == t_b {
            return *y_b;
        }

        match &self.dense {
            Dense::Substep => {
                stats.fn_evals += stepper.evals_per_step();
                stepper.step(sys, t_a, y_a, t - t_a).y
            }
            Dense::Hermite { f_a, f_b } => {
                let dt = t_b - t_a;
                let s = (t - t_a) / dt;
                let s2 = s * s;
                let s3 = s2 * s;
                let h00 = 1.0 - 3.0 * s2 + 2.0 * s3;
                let h10 = s - 2.0 * s2 + s3;
                let h01 = 3.0 * s2 - 2.0 * s3;
                let h11 = s3 - s2;

                let mut y = [0.0; N];
                for (n, y_n) in y.iter_mut().enumerate() {
                    *y_n = h00 * y_a[n] + h10 * dt * f_a[n] + h01 * y_b[n] + h11 * dt * f_b[n];
                }
                y
            }
        }
    }
}

/// A confirmed, localized crossing that has not been committed yet.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<const N: usize> {
    pub index: usize,
    pub crossing: Crossing,
    pub t: f64,
    pub x: [f64; N],
}

/// Localize the crossing of event function `index` within `dense`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn localize<S, St, E, const N: usize>(
    sys: &S,
    stepper: &mut St,
    event: &E,
    dense: &DenseStep<'_, N>,
    index: usize,
    crossing: Crossing,
    g_a: f64,
    g_b: f64,
    brent: &Brent,
    stats: &mut Stats,
) -> Result<Candidate<N>, IntegrationError>
where
    S: OdeSystem<N>,
    St: Stepper<N>,
    E: Event<N>,
{
    let (t_a, t_b) = (dense.ends.t_a, dense.ends.t_b);

    // boundary zero: the crossing is the step endpoint itself
    if g_b == 0.0 {
        return Ok(Candidate {
            index,
            crossing,
            t: t_b,
            x: *dense.ends.y_b,
        });
    }

    let mut g = vec![0.0; event.occurrences().len()];
    let mut event_evals = 0u64;
    let mut non_finite: Option<f64> = None;
    let mut g_at = |t: f64| {
        let x = dense.state_at(stepper, sys, t, stats);
        event.event_fcn(t, &x, &mut g);
        event_evals += 1;
        if g[index].is_finite() {
            g[index]
        } else {
            // a zero ends the search at once; the error is raised below
            non_finite.get_or_insert(t);
            0.0
        }
    };

    let result = brent.find_root(&mut g_at, t_a, g_a, t_b, g_b);
    stats.event_evals += event_evals;
    if let Some(t) = non_finite {
        return Err(IntegrationError::NonFiniteEvent { t });
    }

    let root = result.map_err(|source| IntegrationError::LocalizationFailed {
        index,
        t_a,
        t_b,
        source,
    })?;

    let x = dense.state_at(stepper, sys, root.x, stats);
    Ok(Candidate {
        index,
        crossing,
        t: root.x,
        x,
    })
}

/// Order candidates along the travel direction and group simultaneous ones.
///
/// Candidates within `tie_tol` of the first member of a group share that
/// group and are ordered by ascending function index.
pub(crate) fn order_candidates<const N: usize>(
    mut candidates: Vec<Candidate<N>>,
    direction: f64,
    tie_tol: f64,
) -> Vec<Vec<Candidate<N>>> {
    candidates.sort_by(|a, b| {
        (a.t * direction)
            .total_cmp(&(b.t * direction))
            .then(a.index.cmp(&b.index))
    });

    let mut groups: Vec<Vec<Candidate<N>>> = Vec::new();
    for candidate in candidates {
        match groups.last_mut() {
            Some(group) if (candidate.t - group[0].t).abs() <= tie_tol => group.push(candidate),
            _ => groups.push(vec![candidate]),
        }
    }
    for group in &mut groups {
        group.sort_by_key(|c| c.index);
    }
    groups
}
