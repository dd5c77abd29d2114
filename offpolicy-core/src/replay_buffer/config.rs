//! Configuration of [`ReplayBuffer`](super::ReplayBuffer).
use super::ReplayField;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ReplayBuffer`](super::ReplayBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of transitions. When the buffer is full,
    /// new transitions replace the oldest ones.
    pub capacity: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,

    /// Fields stored in addition to `(o_t, a_t, r_t, o_t+1, done)`.
    #[serde(default)]
    pub extra_fields: Vec<ReplayField>,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 500_000,
            seed: 0,
            extra_fields: vec![],
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Adds an extra field.
    pub fn extra_field(mut self, field: ReplayField) -> Self {
        self.extra_fields.push(field);
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
