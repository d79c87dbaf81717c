//! Event functions monitored during integration.
//!
//! An [`Event`] bundles one or more scalar functions `g_i(t, x)` whose zero
//! crossings are of interest, a direction filter per function, and a
//! termination rule. It also owns the [`Occurrences`] counters that the
//! integrator advances each time a crossing is confirmed.
//!
//! # Common Applications in Astrodynamics
//!
//! - Plane crossings (e.g. the XZ plane, `y = 0`)
//! - Periapsis/apoapsis detection (radial velocity = 0)
//! - Sphere of influence crossing
//! - Altitude threshold crossing

/// Direction of zero-crossing to detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventDirection {
    /// Only crossings where g increases through zero
    Rising,
    /// Only crossings where g decreases through zero
    Falling,
    /// Any zero crossing
    #[default]
    Any,
}

impl From<i32> for EventDirection {
    /// `+1` rising, `-1` falling, `0` either.
    fn from(v: i32) -> Self {
        match v {
            x if x > 0 => EventDirection::Rising,
            x if x < 0 => EventDirection::Falling,
            _ => EventDirection::Any,
        }
    }
}

impl EventDirection {
    /// Whether a crossing passes this filter.
    pub fn accepts(self, crossing: Crossing) -> bool {
        matches!(
            (self, crossing),
            (EventDirection::Any, _)
                | (EventDirection::Rising, Crossing::Rising)
                | (EventDirection::Falling, Crossing::Falling)
        )
    }
}

/// Sense of an observed sign change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// From negative to zero or positive
    Rising,
    /// From positive to zero or negative
    Falling,
}

/// Classify the sign change of `g` over one step.
///
/// A value of exactly zero at the start of a step never begins a crossing:
/// it was already reported by the step that ended on it (or it is the
/// initial point). A value of exactly zero at the end completes one.
pub fn detect_crossing(g_old: f64, g_new: f64) -> Option<Crossing> {
    if g_old < 0.0 && g_new >= 0.0 {
        Some(Crossing::Rising)
    } else if g_old > 0.0 && g_new <= 0.0 {
        Some(Crossing::Falling)
    } else {
        None
    }
}

/// What happens to crossings of a function whose counter already reached its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Saturation {
    /// Keep confirming and recording crossings.
    #[default]
    Record,
    /// Ignore further crossings; they are neither counted nor recorded.
    Suppress,
}

/// Maximum and current occurrence counts, one per event function.
///
/// Counters start at zero and only the integrator advances them, once per
/// confirmed crossing. They are never reset during an integration; reuse an
/// event for a fresh run by constructing a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrences {
    max: Vec<u32>,
    current: Vec<u32>,
    saturation: Saturation,
}

impl Occurrences {
    /// Counters for `max.len()` event functions.
    pub fn new(max: Vec<u32>) -> Self {
        let current = vec![0; max.len()];
        Self {
            max,
            current,
            saturation: Saturation::default(),
        }
    }

    /// Choose how crossings past the maximum are treated.
    pub fn with_saturation(mut self, saturation: Saturation) -> Self {
        self.saturation = saturation;
        self
    }

    /// Number of monitored functions.
    pub fn len(&self) -> usize {
        self.max.len()
    }

    /// Whether no functions are monitored.
    pub fn is_empty(&self) -> bool {
        self.max.is_empty()
    }

    /// Maximum counts.
    pub fn max(&self) -> &[u32] {
        &self.max
    }

    /// Confirmed crossings so far.
    pub fn current(&self) -> &[u32] {
        &self.current
    }

    /// Saturation policy.
    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    /// Whether function `index` has reached its maximum count.
    pub fn is_saturated(&self, index: usize) -> bool {
        self.current[index] >= self.max[index]
    }

    pub(crate) fn admits(&self, index: usize) -> bool {
        self.saturation == Saturation::Record || !self.is_saturated(index)
    }

    pub(crate) fn record(&mut self, index: usize) {
        self.current[index] += 1;
    }
}

/// Event capability set
///
/// Buffers passed to the three functions have length
/// `self.occurrences().len()`.
///
/// # Example
///
/// ```
/// use event_integrator::{Event, EventDirection, Occurrences};
///
/// /// Stop at the first time the altitude drops below a threshold.
/// struct Altitude {
///     threshold: f64,
///     occurrences: Occurrences,
/// }
///
/// impl Event<6> for Altitude {
///     fn occurrences(&self) -> &Occurrences {
///         &self.occurrences
///     }
///
///     fn occurrences_mut(&mut self) -> &mut Occurrences {
///         &mut self.occurrences
///     }
///
///     fn event_fcn(&self, _t: f64, x: &[f64; 6], g: &mut [f64]) {
///         let r = (x[0] * x[0] + x[1] * x[1] + x[2] * x[2]).sqrt();
///         g[0] = r - self.threshold;
///     }
///
///     fn direction_fcn(&self, direction: &mut [EventDirection]) {
///         direction[0] = EventDirection::Falling;
///     }
/// }
///
/// let event = Altitude { threshold: 0.1, occurrences: Occurrences::new(vec![1]) };
/// assert_eq!(event.occurrences().len(), 1);
/// ```
pub trait Event<const N: usize> {
    /// Occurrence counters owned by this event.
    fn occurrences(&self) -> &Occurrences;

    /// Mutable access for the integrator's bookkeeping.
    fn occurrences_mut(&mut self) -> &mut Occurrences;

    /// Evaluate every event function; `g[i]` is zero exactly at an event.
    fn event_fcn(&self, t: f64, x: &[f64; N], g: &mut [f64]);

    /// Termination flags at a confirmed occurrence. Any raised flag stops
    /// the integration.
    ///
    /// The default stops once any function has reached its maximum count.
    fn terminate_fcn(&self, _t: f64, _x: &[f64; N], terminate: &mut [bool]) {
        let occurrences = self.occurrences();
        for (i, flag) in terminate.iter_mut().enumerate() {
            *flag = occurrences.is_saturated(i);
        }
    }

    /// Direction filter per function. The default accepts any direction.
    fn direction_fcn(&self, direction: &mut [EventDirection]) {
        direction.fill(EventDirection::Any);
    }
}

/// Crossing of a coordinate plane `x[component] = 0`.
///
/// Terminates once the configured number of crossings has been confirmed.
#[derive(Debug, Clone)]
pub struct AxisCrossing {
    component: usize,
    direction: EventDirection,
    occurrences: Occurrences,
}

impl AxisCrossing {
    /// Monitor `x[component]`, stopping after `n_cross` crossings.
    pub fn new(component: usize, n_cross: u32) -> Self {
        Self {
            component,
            direction: EventDirection::Any,
            occurrences: Occurrences::new(vec![n_cross]),
        }
    }

    /// Crossings of the XZ plane (`y = 0`).
    pub fn xz_plane(n_cross: u32) -> Self {
        Self::new(1, n_cross)
    }

    /// Restrict which crossings count.
    pub fn with_direction(mut self, direction: EventDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Monitored state component.
    pub fn component(&self) -> usize {
        self.component
    }
}

impl<const N: usize> Event<N> for AxisCrossing {
    fn occurrences(&self) -> &Occurrences {
        &self.occurrences
    }

    fn occurrences_mut(&mut self) -> &mut Occurrences {
        &mut self.occurrences
    }

    /// # Panics
    /// If the monitored component is outside the state.
    fn event_fcn(&self, _t: f64, x: &[f64; N], g: &mut [f64]) {
        g[0] = x[self.component];
    }

    fn direction_fcn(&self, direction: &mut [EventDirection]) {
        direction[0] = self.direction;
    }
}

/// Event with no monitored functions; integration runs to the end of the span.
#[derive(Debug, Clone)]
pub struct NoEvent {
    occurrences: Occurrences,
}

impl Default for NoEvent {
    fn default() -> Self {
        Self {
            occurrences: Occurrences::new(Vec::new()),
        }
    }
}

impl<const N: usize> Event<N> for NoEvent {
    fn occurrences(&self) -> &Occurrences {
        &self.occurrences
    }

    fn occurrences_mut(&mut self) -> &mut Occurrences {
        &mut self.occurrences
    }

    fn event_fcn(&self, _t: f64, _x: &[f64; N], _g: &mut [f64]) {}
}
