#![warn(missing_docs)]
//! Off-policy training loop with a replay buffer.
//!
//! An [`OffPolicyTrainer`] interleaves sampling from a [`Sampler`] with
//! learning steps of the sampler's [`Policy`] on batches drawn uniformly from
//! a [`ReplayBuffer`](replay_buffer::ReplayBuffer).
//!
//! ```rust
//! use offpolicy_core::{dummy::CountingSampler, OffPolicyTrainer, OffPolicyTrainerConfig};
//!
//! let config = OffPolicyTrainerConfig::default()
//!     .learning_starts(10)
//!     .train_batch_size(4);
//! let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(1)).unwrap();
//!
//! let result = trainer.train().unwrap();
//! assert_eq!(result.warmup_timesteps, 10);
//! assert_eq!(result.tracker.num_steps_sampled, 11);
//! assert_eq!(result.tracker.num_steps_trained, 4);
//! ```
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;
pub mod schedule;

mod base;
pub use base::{
    fields, Action, Column, Env, ExperienceBufferBase, GlobalVars, Policy, ReplayBufferBase,
    SampleBatch, Sampler, Space, Step, Transition,
};

mod trainer;
pub use trainer::{
    EnvSampler, IterationResult, OffPolicyTrainer, OffPolicyTrainerConfig, StepTracker,
};
