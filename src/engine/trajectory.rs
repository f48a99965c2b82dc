//! Fixed-length trajectory of phase-space samples.

use serde::{Deserialize, Serialize};

use super::state::{PhaseState, Vector};

/// Ordered `(time, state)` samples produced by one run.
///
/// The length is fixed when the run is configured. Once returned to the
/// caller the trajectory is read-only as far as this crate is concerned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<PhaseState>,
}

impl Trajectory {
    /// Build from parallel time and state sequences.
    ///
    /// Returns `None` if the sequences differ in length.
    #[must_use]
    pub fn from_parts(times: Vec<f64>, states: Vec<PhaseState>) -> Option<Self> {
        (times.len() == states.len()).then_some(Self { times, states })
    }

    /// Empty trajectory with room for `n` samples.
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            states: Vec::with_capacity(n),
        }
    }

    /// Append one sample.
    pub(crate) fn push(&mut self, time: f64, state: PhaseState) {
        self.times.push(time);
        self.states.push(state);
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sample times `[0, h, 2h, ...]`.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Phase-space samples.
    #[must_use]
    pub fn states(&self) -> &[PhaseState] {
        &self.states
    }

    /// Sample `i` as `(time, state)`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<(f64, &PhaseState)> {
        Some((*self.times.get(i)?, self.states.get(i)?))
    }

    /// First sample.
    #[must_use]
    pub fn first(&self) -> Option<(f64, &PhaseState)> {
        self.get(0)
    }

    /// Last sample.
    #[must_use]
    pub fn last(&self) -> Option<(f64, &PhaseState)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Position column, cloned out of the samples.
    #[must_use]
    pub fn positions(&self) -> Vec<Vector> {
        self.states.iter().map(|s| s.position.clone()).collect()
    }

    /// Velocity column, cloned out of the samples.
    #[must_use]
    pub fn velocities(&self) -> Vec<Vector> {
        self.states.iter().map(|s| s.velocity.clone()).collect()
    }

    /// Iterate over `(time, state)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &PhaseState)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }
}
