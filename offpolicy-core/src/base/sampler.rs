//! Sampler.
use super::{Policy, SampleBatch};
use crate::record::Record;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Variables the learner shares with samplers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVars {
    /// Number of environment steps sampled in the training run.
    pub timestep: usize,
}

/// Produces batches of transitions by interacting with an environment.
///
/// A sampler owns the policy used for collecting transitions. Implementations
/// may run synchronously like [`EnvSampler`](crate::EnvSampler) or delegate to
/// a pool of threads or remote processes; the training loop only sees this trait.
pub trait Sampler {
    /// The policy used for sampling and trained by the training loop.
    type Policy: Policy;

    /// Collects a fragment of transitions.
    fn sample(&mut self) -> Result<SampleBatch>;

    /// Number of transitions returned by each call to [`Sampler::sample`].
    fn rollout_fragment_length(&self) -> usize;

    /// Returns the policy.
    fn policy(&self) -> &Self::Policy;

    /// Returns the policy mutably.
    fn policy_mut(&mut self) -> &mut Self::Policy;

    /// Receives the variables broadcast by the learner.
    fn set_global_vars(&mut self, vars: &GlobalVars);

    /// Returns statistics of the episodes completed since the last call.
    fn episode_metrics(&mut self) -> Record {
        Record::empty()
    }
}
