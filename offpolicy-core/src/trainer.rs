//! Train a [`Policy`](crate::Policy) off-policy with a replay buffer.
mod config;
mod env_sampler;
mod result;
mod tracker;
use crate::{
    error::OffPolicyError,
    record::{AggregateRecorder, Record},
    replay_buffer::{ReplayBuffer, ReplayBufferConfig},
    ExperienceBufferBase, GlobalVars, Policy, ReplayBufferBase, SampleBatch, Sampler, Transition,
};
use anyhow::Result;
pub use config::OffPolicyTrainerConfig;
pub use env_sampler::EnvSampler;
use log::{debug, info, warn};
pub use result::IterationResult;
pub use tracker::StepTracker;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the off-policy training loop.
///
/// # Training iteration
///
/// Each call to [`OffPolicyTrainer::train`] runs one iteration:
///
/// 0. Warm-up. While fewer than `learning_starts` steps have been sampled in
///    the training run, call [`Sampler::sample`] and push every transition into
///    the replay buffer. If any step was collected, the new timestep is sent to
///    the sampler with [`Sampler::set_global_vars`]. The condition only holds
///    before the first iteration, so the warm-up runs at most once.
/// 1. Call [`Sampler::sample`] and push every transition into the replay buffer.
///    `num_steps_sampled += samples.count()`.
/// 2. Call [`Policy::before_replay_steps`].
/// 3. `samples.count()` times, sample a batch of `train_batch_size` transitions
///    and give it to [`Policy::learn_on_batch`].
///    `num_steps_trained += batch.count()`.
/// 4. Back to 1 until at least `max(timesteps_per_iteration, 1)` steps have been
///    sampled in the iteration.
///
/// Statistics returned by the policy are merged by key; the last value wins.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Sampler]-->|SampleBatch|B[ReplayBuffer]
///     B -->|SampleBatch|C[Policy]
///     C -->|Record|D[OffPolicyTrainer]
///     D -->|GlobalVars|A
/// ```
///
/// Sampling and learning are interleaved on a single sampler, which makes the
/// ratio of environment steps to learning steps deterministic. Configurations
/// with additional workers, and samplers whose fragment length differs from
/// `rollout_fragment_length`, are rejected by [`OffPolicyTrainer::build`].
pub struct OffPolicyTrainer<S, R = ReplayBuffer>
where
    S: Sampler,
    R: ExperienceBufferBase<Item = Transition>
        + ReplayBufferBase<Config = ReplayBufferConfig, Batch = SampleBatch>,
{
    config: OffPolicyTrainerConfig,

    sampler: S,

    replay: R,

    tracker: StepTracker,

    global_vars: GlobalVars,

    /// Number of completed iterations.
    iteration: usize,
}

impl<S: Sampler> OffPolicyTrainer<S> {
    /// Constructs a trainer with a [`ReplayBuffer`].
    ///
    /// Fails if the configuration is invalid or the fragment length of the
    /// sampler differs from `rollout_fragment_length`. Nothing is sampled here.
    pub fn build(config: OffPolicyTrainerConfig, sampler: S) -> Result<Self> {
        Self::build_with_replay_buffer(config, sampler)
    }
}

impl<S, R> OffPolicyTrainer<S, R>
where
    S: Sampler,
    R: ExperienceBufferBase<Item = Transition>
        + ReplayBufferBase<Config = ReplayBufferConfig, Batch = SampleBatch>,
{
    /// Constructs a trainer with a replay buffer of type `R`.
    pub fn build_with_replay_buffer(config: OffPolicyTrainerConfig, sampler: S) -> Result<Self> {
        config.validate()?;
        if sampler.rollout_fragment_length() != config.rollout_fragment_length {
            return Err(OffPolicyError::InvalidConfig(format!(
                "rollout_fragment_length of the sampler is {}, expected {}",
                sampler.rollout_fragment_length(),
                config.rollout_fragment_length
            ))
            .into());
        }
        let replay = Self::build_replay_buffer(&config, &sampler)?;
        info!(
            "Built off-policy trainer: buffer_size = {}, learning_starts = {}, train_batch_size = {}",
            config.buffer_size, config.learning_starts, config.train_batch_size
        );

        Ok(Self {
            config,
            sampler,
            replay,
            tracker: StepTracker::default(),
            global_vars: GlobalVars::default(),
            iteration: 0,
        })
    }

    fn build_replay_buffer(config: &OffPolicyTrainerConfig, sampler: &S) -> Result<R> {
        let policy = sampler.policy();
        R::build(
            &config.replay_buffer_config(),
            policy.observation_space(),
            policy.action_space(),
        )
    }

    fn push_samples(replay: &mut R, samples: &SampleBatch) -> Result<()> {
        for row in samples.rows() {
            replay.push(row)?;
        }
        Ok(())
    }

    /// Samples until `learning_starts` steps have been collected in the training run.
    ///
    /// Returns the number of steps sampled by this call.
    pub fn sample_until_learning_starts(&mut self) -> Result<usize> {
        let learning_starts = self.config.learning_starts;
        let mut sample_count = 0;

        while self.tracker.num_steps_sampled + sample_count < learning_starts {
            let samples = self.sampler.sample()?;
            sample_count += samples.count();
            Self::push_samples(&mut self.replay, &samples)?;
        }

        if sample_count > 0 {
            self.tracker.num_steps_sampled += sample_count;
            self.global_vars.timestep = self.tracker.num_steps_sampled;
            self.sampler.set_global_vars(&self.global_vars);
            info!("Sampled {} steps before learning starts", sample_count);
        }

        Ok(sample_count)
    }

    fn iteration_done(&self, init_timesteps: usize) -> bool {
        let threshold = self.config.timesteps_per_iteration.max(1);
        self.tracker.num_steps_sampled - init_timesteps >= threshold
    }

    /// Runs a training iteration.
    ///
    /// Errors of the sampler, the replay buffer and the policy are returned as
    /// they are; the iteration is not retried.
    pub fn train(&mut self) -> Result<IterationResult> {
        let warmup_timesteps = self.sample_until_learning_starts()?;
        let init_timesteps = self.tracker.num_steps_sampled;
        let train_batch_size = self.config.train_batch_size;
        let mut stats = Record::empty();

        while !self.iteration_done(init_timesteps) {
            let samples = self.sampler.sample()?;
            if samples.is_empty() {
                warn!("Sampler returned an empty batch");
            }
            self.tracker.num_steps_sampled += samples.count();
            Self::push_samples(&mut self.replay, &samples)?;

            let policy = self.sampler.policy_mut();
            stats.merge_inplace(policy.exploration_info());
            policy.before_replay_steps()?;

            for _ in 0..samples.count() {
                let batch = self.replay.batch(train_batch_size)?;
                stats.merge_inplace(policy.learn_on_batch(&batch)?);
                self.tracker.num_steps_trained += batch.count();
            }
        }

        self.iteration += 1;
        debug!(
            "Iteration {}: num_steps_sampled = {}, num_steps_trained = {}",
            self.iteration, self.tracker.num_steps_sampled, self.tracker.num_steps_trained
        );

        Ok(IterationResult {
            stats,
            episode_metrics: self.sampler.episode_metrics(),
            timesteps_this_iter: self.tracker.num_steps_sampled - init_timesteps,
            warmup_timesteps,
            tracker: self.tracker,
            training_iteration: self.iteration,
        })
    }

    /// Runs `n_iterations` iterations and stores their records in `recorder`.
    ///
    /// The recorder is flushed every `flush_interval` iterations and after the
    /// last one.
    pub fn run(&mut self, n_iterations: usize, recorder: &mut dyn AggregateRecorder) -> Result<()> {
        let flush_interval = self.config.flush_interval;

        for _ in 0..n_iterations {
            let result = self.train()?;
            info!(
                "Iteration {} done: timesteps_this_iter = {}, num_steps_sampled = {}",
                result.training_iteration,
                result.timesteps_this_iter,
                result.tracker.num_steps_sampled
            );
            recorder.store(result.into_record());

            if self.iteration % flush_interval == 0 {
                recorder.flush(self.iteration as _);
            }
        }

        if n_iterations > 0 && self.iteration % flush_interval != 0 {
            recorder.flush(self.iteration as _);
        }

        Ok(())
    }

    /// Step counters.
    pub fn tracker(&self) -> &StepTracker {
        &self.tracker
    }

    /// Variables last broadcast to the sampler.
    pub fn global_vars(&self) -> &GlobalVars {
        &self.global_vars
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Configuration.
    pub fn config(&self) -> &OffPolicyTrainerConfig {
        &self.config
    }

    /// The replay buffer.
    pub fn replay_buffer(&self) -> &R {
        &self.replay
    }

    /// The sampler.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// The sampler, mutably.
    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    /// The policy being trained.
    pub fn policy(&self) -> &S::Policy {
        self.sampler.policy()
    }
}
