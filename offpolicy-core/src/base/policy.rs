//! Policy.
use super::{SampleBatch, Space};
use crate::record::Record;
use anyhow::Result;
use std::collections::BTreeMap;

/// An action computed by a [`Policy`].
///
/// `extras` are attached to the transition collected with the action,
/// e.g., `action_logp`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Action {
    /// Values of the action.
    pub values: Vec<f32>,

    /// Extra fields of the transition.
    pub extras: BTreeMap<String, Vec<f32>>,
}

impl Action {
    /// Creates an action without extra fields.
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            extras: BTreeMap::new(),
        }
    }

    /// Attaches an extra field.
    pub fn with_extra(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.extras.insert(name.into(), values);
        self
    }
}

/// A trainable policy.
///
/// The policy owns its models and optimizers; the training loop only hands it
/// batches sampled from the replay buffer.
pub trait Policy {
    /// Space of observations.
    fn observation_space(&self) -> &Space;

    /// Space of actions.
    fn action_space(&self) -> &Space;

    /// Computes an action for the observation.
    ///
    /// `timestep` is the number of environment steps sampled so far in the
    /// training run, to be used by exploration schedules.
    fn compute_action(&mut self, obs: &[f32], timestep: usize) -> Result<Action>;

    /// Performs a gradient update with a batch and returns statistics.
    fn learn_on_batch(&mut self, batch: &SampleBatch) -> Result<Record>;

    /// Returns statistics of the exploration strategy.
    fn exploration_info(&self) -> Record {
        Record::empty()
    }

    /// Called before the learning steps following each sample.
    fn before_replay_steps(&mut self) -> Result<()> {
        Ok(())
    }
}
