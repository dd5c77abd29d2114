//! Configuration of [`OffPolicyTrainer`](super::OffPolicyTrainer).
use crate::{
    error::OffPolicyError,
    replay_buffer::{ReplayBufferConfig, ReplayField},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`OffPolicyTrainer`](super::OffPolicyTrainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct OffPolicyTrainerConfig {
    /// Capacity of the replay buffer.
    pub buffer_size: usize,

    /// Number of environment steps sampled before the first learning step.
    pub learning_starts: usize,

    /// Size of the mini-batch of each learning step.
    pub train_batch_size: usize,

    /// Number of environment steps collected by each call to the sampler.
    pub rollout_fragment_length: usize,

    /// Number of additional sampling workers. Must be 0.
    pub num_workers: usize,

    /// Seed of the replay buffer.
    pub seed: u64,

    /// Minimum number of environment steps sampled in an iteration.
    pub timesteps_per_iteration: usize,

    /// Fields stored in the replay buffer in addition to `(o_t, a_t, r_t, o_t+1, done)`.
    pub extra_fields: Vec<ReplayField>,

    /// Interval of flushing records in iterations.
    pub flush_interval: usize,
}

impl Default for OffPolicyTrainerConfig {
    fn default() -> Self {
        Self {
            buffer_size: 500_000,
            learning_starts: 0,
            train_batch_size: 128,
            rollout_fragment_length: 1,
            num_workers: 0,
            seed: 0,
            timesteps_per_iteration: 0,
            extra_fields: vec![],
            flush_interval: 1,
        }
    }
}

impl OffPolicyTrainerConfig {
    /// Sets the capacity of the replay buffer.
    pub fn buffer_size(mut self, v: usize) -> Self {
        self.buffer_size = v;
        self
    }

    /// Sets the number of warm-up steps.
    pub fn learning_starts(mut self, v: usize) -> Self {
        self.learning_starts = v;
        self
    }

    /// Sets the mini-batch size.
    pub fn train_batch_size(mut self, v: usize) -> Self {
        self.train_batch_size = v;
        self
    }

    /// Sets the number of steps per sampler call.
    pub fn rollout_fragment_length(mut self, v: usize) -> Self {
        self.rollout_fragment_length = v;
        self
    }

    /// Sets the number of additional sampling workers.
    pub fn num_workers(mut self, v: usize) -> Self {
        self.num_workers = v;
        self
    }

    /// Sets the seed of the replay buffer.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the minimum number of steps sampled in an iteration.
    pub fn timesteps_per_iteration(mut self, v: usize) -> Self {
        self.timesteps_per_iteration = v;
        self
    }

    /// Adds an extra field of the replay buffer.
    pub fn extra_field(mut self, field: ReplayField) -> Self {
        self.extra_fields.push(field);
        self
    }

    /// Sets the interval of flushing records in iterations.
    pub fn flush_interval(mut self, v: usize) -> Self {
        self.flush_interval = v;
        self
    }

    /// Checks the constraints of the training loop.
    pub fn validate(&self) -> Result<(), OffPolicyError> {
        let invalid = |msg: &str| Err(OffPolicyError::InvalidConfig(msg.to_string()));

        if self.num_workers != 0 {
            return invalid("num_workers must be 0");
        }
        if self.rollout_fragment_length < 1 {
            return invalid("rollout_fragment_length must be at least 1");
        }
        if self.buffer_size < 1 {
            return invalid("buffer_size must be at least 1");
        }
        if self.train_batch_size < 1 {
            return invalid("train_batch_size must be at least 1");
        }
        if self.flush_interval < 1 {
            return invalid("flush_interval must be at least 1");
        }
        Ok(())
    }

    /// Configuration of the replay buffer.
    pub fn replay_buffer_config(&self) -> ReplayBufferConfig {
        ReplayBufferConfig {
            capacity: self.buffer_size,
            seed: self.seed,
            extra_fields: self.extra_fields.clone(),
        }
    }

    /// Constructs [`OffPolicyTrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`OffPolicyTrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
