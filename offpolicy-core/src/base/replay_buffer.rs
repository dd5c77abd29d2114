//! Replay buffer interface.
use super::Space;
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer holds no experience.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// The type of batch generated for training.
    type Batch;

    /// Builds a replay buffer holding elements of the given spaces.
    fn build(config: &Self::Config, obs_space: &Space, act_space: &Space) -> Result<Self>
    where
        Self: Sized;

    /// Samples a batch of `size` experiences.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
