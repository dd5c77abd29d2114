//! Exploration schedules driven by the number of sampled steps.
use serde::{Deserialize, Serialize};

/// Linearly interpolates a value over environment steps.
///
/// The value moves from `initial` to `final_value` during the first `horizon`
/// steps and stays at `final_value` afterwards. A typical use is the epsilon of
/// epsilon-greedy exploration, evaluated at the timestep given to
/// [`Policy::compute_action`](crate::Policy::compute_action).
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LinearSchedule {
    /// Value at timestep 0.
    pub initial: f32,

    /// Value from `horizon` on.
    pub final_value: f32,

    /// Number of steps of the interpolation.
    pub horizon: usize,
}

impl LinearSchedule {
    /// Creates a schedule.
    pub fn new(initial: f32, final_value: f32, horizon: usize) -> Self {
        Self {
            initial,
            final_value,
            horizon,
        }
    }

    /// A schedule that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(value, value, 0)
    }

    /// Value at `timestep`.
    pub fn value(&self, timestep: usize) -> f32 {
        if timestep >= self.horizon {
            self.final_value
        } else {
            let d = self.final_value - self.initial;
            self.initial + d * (timestep as f32 / self.horizon as f32)
        }
    }
}
