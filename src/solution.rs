//! Accumulated integration results.

/// How an integration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The end of the time span was reached.
    Completed,
    /// An event's termination flag stopped the integration.
    Terminated,
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Derivative evaluations, including those spent on localization
    pub fn_evals: u64,
    /// Event function evaluations
    pub event_evals: u64,
    /// Number of accepted steps
    pub accepted_steps: u64,
    /// Number of rejected steps
    pub rejected_steps: u64,
}

/// Accepted steps, in travel order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory<const N: usize> {
    /// Sample times
    pub t: Vec<f64>,
    /// States at `t`
    pub x: Vec<[f64; N]>,
}

impl<const N: usize> Trajectory<N> {
    pub(crate) fn push(&mut self, t: f64, x: [f64; N]) {
        self.t.push(t);
        self.x.push(x);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Last sample.
    pub fn last(&self) -> Option<(f64, &[f64; N])> {
        Some((*self.t.last()?, self.x.last()?))
    }

    /// Iterate over `(t, x)` samples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64; N])> {
        self.t.iter().copied().zip(self.x.iter())
    }
}

/// Confirmed event occurrences, in travel order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventTrajectory<const N: usize> {
    /// Event times
    pub t: Vec<f64>,
    /// States at the events
    pub x: Vec<[f64; N]>,
    /// Index of the event function that fired
    pub index: Vec<usize>,
}

impl<const N: usize> EventTrajectory<N> {
    pub(crate) fn push(&mut self, t: f64, x: [f64; N], index: usize) {
        self.t.push(t);
        self.x.push(x);
        self.index.push(index);
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether no event was recorded.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Iterate over `(t, x, index)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64; N], usize)> {
        self.t
            .iter()
            .copied()
            .zip(self.x.iter())
            .zip(self.index.iter().copied())
            .map(|((t, x), i)| (t, x, i))
    }
}

/// Result of a successful integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// How the integration ended
    pub status: Status,
    /// Accepted steps; the last entry is the span end or the terminating event
    pub trajectory: Trajectory<N>,
    /// Confirmed events
    pub events: EventTrajectory<N>,
    /// Work counters
    pub stats: Stats,
}

/// Results accumulated before a fatal error. Incomplete by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial<const N: usize> {
    /// Accepted steps up to the failure
    pub trajectory: Trajectory<N>,
    /// Events committed before the failure
    pub events: EventTrajectory<N>,
    /// Work counters
    pub stats: Stats,
}

/// Running accumulation owned by one integration call.
#[derive(Debug, Default)]
pub(crate) struct Recorder<const N: usize> {
    pub trajectory: Trajectory<N>,
    pub events: EventTrajectory<N>,
    pub stats: Stats,
}

impl<const N: usize> Recorder<N> {
    pub fn new(t0: f64, x0: [f64; N]) -> Self {
        let mut recorder = Self::default();
        recorder.trajectory.push(t0, x0);
        recorder
    }

    pub fn finish(self, status: Status) -> Solution<N> {
        Solution {
            status,
            trajectory: self.trajectory,
            events: self.events,
            stats: self.stats,
        }
    }

    pub fn abandon(self) -> Partial<N> {
        Partial {
            trajectory: self.trajectory,
            events: self.events,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_starts_with_initial_state() {
        let recorder = Recorder::new(2.0, [1.0, -1.0]);
        let solution = recorder.finish(Status::Completed);
        assert_eq!(solution.trajectory.len(), 1);
        assert_eq!(solution.trajectory.last(), Some((2.0, &[1.0, -1.0])));
        assert!(solution.events.is_empty());
    }

    #[test]
    fn test_event_trajectory_iter() {
        let mut events = EventTrajectory::<1>::default();
        events.push(0.5, [1.0], 0);
        events.push(0.7, [2.0], 3);
        let collected: Vec<_> = events.iter().collect();
        assert_eq!(collected, vec![(0.5, &[1.0], 0), (0.7, &[2.0], 3)]);
    }
}
