//! Integration window.

use crate::error::IntegrationError;

/// Start and end of an integration; `end < start` integrates backward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    start: f64,
    end: f64,
}

impl TimeSpan {
    /// Create a span from two distinct, finite times.
    pub fn new(start: f64, end: f64) -> Result<Self, IntegrationError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(IntegrationError::InvalidInput {
                message: format!("time span [{}, {}] must be finite", start, end),
            });
        }
        if start == end {
            return Err(IntegrationError::InvalidInput {
                message: format!("time span [{}, {}] has zero length", start, end),
            });
        }
        Ok(Self { start, end })
    }

    /// Create a span from a list of time markers.
    ///
    /// Only the first and last markers bound the window; intermediate
    /// markers are accepted but not honored as checkpoints.
    pub fn from_markers(markers: &[f64]) -> Result<Self, IntegrationError> {
        match markers {
            [start, .., end] => Self::new(*start, *end),
            _ => Err(IntegrationError::InvalidInput {
                message: format!(
                    "time specification needs at least 2 values, got {}",
                    markers.len()
                ),
            }),
        }
    }

    /// First time of the window.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Last time of the window.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Travel direction: `1.0` forward, `-1.0` backward.
    pub fn direction(&self) -> f64 {
        (self.end - self.start).signum()
    }

    /// Whether `t` has reached or passed the end along the travel direction.
    pub fn reached_end(&self, t: f64) -> bool {
        (t - self.end) * self.direction() >= 0.0
    }
}
