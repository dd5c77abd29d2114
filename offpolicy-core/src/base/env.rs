//! Environment.
use anyhow::Result;

/// Result of an environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Observation `o_t+1`.
    pub obs: Vec<f32>,

    /// Reward `r_t`.
    pub reward: f32,

    /// Flag denoting if the episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if the episode is truncated, e.g., by a time limit.
    pub is_truncated: bool,
}

impl Step {
    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Vec<f32>>;

    /// Performes an environment step.
    fn step(&mut self, act: &[f32]) -> Result<Step>;
}
