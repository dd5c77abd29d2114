//! Test doubles of the collaborators of the training loop.
//!
//! These types stand in for real environments, policies and samplers in
//! tests and documentation examples.
use crate::{
    record::{Record, RecordValue},
    schedule::LinearSchedule,
    Action, Env, GlobalVars, Policy, SampleBatch, Sampler, Space, Step, Transition,
};
use anyhow::{bail, Result};

/// A policy that does not learn anything.
///
/// It keeps track of the calls made by the training loop. Actions are always
/// zero with an `action_logp` extra field; `exploration_info` reports an
/// epsilon from a [`LinearSchedule`] at the last timestep seen.
pub struct DummyPolicy {
    obs_space: Space,
    act_space: Space,
    epsilon: LinearSchedule,
    last_timestep: usize,
    fail_at: Option<usize>,

    /// Sizes of the batches given to [`Policy::learn_on_batch`].
    pub batch_sizes: Vec<usize>,

    /// Number of calls to [`Policy::before_replay_steps`].
    pub n_before_replay_steps: usize,

    /// Timesteps given to [`Policy::compute_action`].
    pub timesteps: Vec<usize>,
}

impl DummyPolicy {
    /// Creates a policy with 1-dimensional observations and actions.
    pub fn new() -> Self {
        Self::with_spaces(Space::continuous(&[1]), Space::continuous(&[1]))
    }

    /// Creates a policy with the given spaces.
    pub fn with_spaces(obs_space: Space, act_space: Space) -> Self {
        Self {
            obs_space,
            act_space,
            epsilon: LinearSchedule::new(1.0, 0.0, 100),
            last_timestep: 0,
            fail_at: None,
            batch_sizes: vec![],
            n_before_replay_steps: 0,
            timesteps: vec![],
        }
    }

    /// Makes the `n`-th call (1-based) to [`Policy::learn_on_batch`] fail.
    pub fn fail_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Number of learning steps performed.
    pub fn n_learn_calls(&self) -> usize {
        self.batch_sizes.len()
    }
}

impl Default for DummyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for DummyPolicy {
    fn observation_space(&self) -> &Space {
        &self.obs_space
    }

    fn action_space(&self) -> &Space {
        &self.act_space
    }

    fn compute_action(&mut self, _obs: &[f32], timestep: usize) -> Result<Action> {
        self.last_timestep = timestep;
        self.timesteps.push(timestep);
        Ok(Action::new(vec![0.0; self.act_space.flat_dim()]).with_extra("action_logp", vec![0.0]))
    }

    fn learn_on_batch(&mut self, batch: &SampleBatch) -> Result<Record> {
        let n = self.batch_sizes.len() + 1;
        if self.fail_at == Some(n) {
            bail!("learning step {} failed", n);
        }
        self.batch_sizes.push(batch.count());

        let reward_mean = batch.rows().filter_map(|tr| tr.reward()).sum::<f32>()
            / batch.count().max(1) as f32;
        Ok(Record::from_slice(&[
            ("learn_calls", RecordValue::Scalar(n as f32)),
            ("batch_reward_mean", RecordValue::Scalar(reward_mean)),
        ]))
    }

    fn exploration_info(&self) -> Record {
        Record::from_scalar("epsilon", self.epsilon.value(self.last_timestep))
    }

    fn before_replay_steps(&mut self) -> Result<()> {
        self.n_before_replay_steps += 1;
        Ok(())
    }
}

/// A sampler emitting labeled transitions without an environment.
///
/// The `k`-th transition sampled (0-based) has observation `[k]`, action `[0]`,
/// reward `k` and next observation `[k + 1]`.
pub struct CountingSampler {
    policy: DummyPolicy,
    fragment_length: usize,
    next_label: usize,

    /// Number of calls to [`Sampler::sample`].
    pub n_sample_calls: usize,

    /// Every value given to [`Sampler::set_global_vars`].
    pub global_vars: Vec<GlobalVars>,
}

impl CountingSampler {
    /// Creates a sampler returning `fragment_length` transitions per call.
    pub fn new(fragment_length: usize) -> Self {
        Self::with_policy(DummyPolicy::new(), fragment_length)
    }

    /// Creates a sampler with the given policy.
    pub fn with_policy(policy: DummyPolicy, fragment_length: usize) -> Self {
        Self {
            policy,
            fragment_length,
            next_label: 0,
            n_sample_calls: 0,
            global_vars: vec![],
        }
    }
}

impl Sampler for CountingSampler {
    type Policy = DummyPolicy;

    fn sample(&mut self) -> Result<SampleBatch> {
        self.n_sample_calls += 1;
        let transitions = (0..self.fragment_length)
            .map(|_| {
                let x = self.next_label as f32;
                self.next_label += 1;
                Transition::new(vec![x], vec![0.0], x, vec![x + 1.0], false)
                    .with_extra("action_logp", vec![0.0])
            })
            .collect::<Vec<_>>();
        SampleBatch::from_transitions(&transitions)
    }

    fn rollout_fragment_length(&self) -> usize {
        self.fragment_length
    }

    fn policy(&self) -> &DummyPolicy {
        &self.policy
    }

    fn policy_mut(&mut self) -> &mut DummyPolicy {
        &mut self.policy
    }

    fn set_global_vars(&mut self, vars: &GlobalVars) {
        self.global_vars.push(*vars);
    }
}

/// An environment walking along a line.
///
/// The observation is the number of steps taken in the episode. Every step
/// gives reward `1`. The episode terminates after `episode_len` steps, or is
/// truncated there instead if constructed with [`DummyEnv::truncating`].
pub struct DummyEnv {
    episode_len: usize,
    truncate: bool,
    t: usize,

    /// Number of calls to [`Env::reset`].
    pub n_resets: usize,
}

impl DummyEnv {
    /// Creates an environment whose episodes terminate after `episode_len` steps.
    pub fn new(episode_len: usize) -> Self {
        Self {
            episode_len,
            truncate: false,
            t: 0,
            n_resets: 0,
        }
    }

    /// Creates an environment whose episodes are truncated after `episode_len` steps.
    pub fn truncating(episode_len: usize) -> Self {
        Self {
            truncate: true,
            ..Self::new(episode_len)
        }
    }
}

impl Env for DummyEnv {
    fn reset(&mut self) -> Result<Vec<f32>> {
        self.t = 0;
        self.n_resets += 1;
        Ok(vec![0.0])
    }

    fn step(&mut self, _act: &[f32]) -> Result<Step> {
        self.t += 1;
        let end = self.t >= self.episode_len;
        Ok(Step {
            obs: vec![self.t as f32],
            reward: 1.0,
            is_terminated: end && !self.truncate,
            is_truncated: end && self.truncate,
        })
    }
}
