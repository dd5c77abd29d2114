//! Synchronous sampling from a single environment.
//!
//! [`EnvSampler`] runs the policy it owns on an environment and turns every
//! step into a [`Transition`]:
//!
//! 1. Reset the environment if no episode is running.
//! 2. Compute an action with the policy at the current timestep.
//! 3. Apply the action and build `(o_t, a_t, r_t, o_t+1, done)` with the
//!    extra fields of the action.
//! 4. Track the return and the length of the episode.
use crate::{
    record::{Record, RecordValue},
    Env, GlobalVars, Policy, SampleBatch, Sampler, Transition,
};
use anyhow::Result;
use log::{debug, trace};

/// Collects fragments of `rollout_fragment_length` steps from an environment.
///
/// Episodes are not cut at fragment boundaries: the next call to
/// [`Sampler::sample`] continues the running episode. The `dones` field holds
/// the termination flag only, a truncated episode is reset without marking
/// the transition as terminal.
pub struct EnvSampler<E, P>
where
    E: Env,
    P: Policy,
{
    env: E,

    policy: P,

    rollout_fragment_length: usize,

    /// Timestep given to the policy.
    timestep: usize,

    /// Previous observation, `None` if the environment has to be reset.
    prev_obs: Option<Vec<f32>>,

    episode_return: f32,

    episode_len: usize,

    /// `(return, length)` of episodes completed since the last report.
    completed: Vec<(f32, usize)>,
}

impl<E, P> EnvSampler<E, P>
where
    E: Env,
    P: Policy,
{
    /// Creates a sampler.
    pub fn new(env: E, policy: P, rollout_fragment_length: usize) -> Self {
        Self {
            env,
            policy,
            rollout_fragment_length,
            timestep: 0,
            prev_obs: None,
            episode_return: 0.0,
            episode_len: 0,
            completed: vec![],
        }
    }

    /// Timestep given to the policy at the next step.
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    /// Returns the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    fn step(&mut self) -> Result<Transition> {
        let obs = match self.prev_obs.take() {
            Some(obs) => obs,
            None => self.env.reset()?,
        };

        let act = self.policy.compute_action(&obs, self.timestep)?;
        let step = self.env.step(&act.values)?;
        self.timestep += 1;
        self.episode_return += step.reward;
        self.episode_len += 1;

        let is_done = step.is_done();
        let new_obs = step.obs;
        if is_done {
            trace!(
                "Episode finished: return = {}, length = {}",
                self.episode_return,
                self.episode_len
            );
            self.completed.push((self.episode_return, self.episode_len));
            self.episode_return = 0.0;
            self.episode_len = 0;
        } else {
            self.prev_obs = Some(new_obs.clone());
        }

        let tr = Transition::new(obs, act.values, step.reward, new_obs, step.is_terminated);
        Ok(act
            .extras
            .into_iter()
            .fold(tr, |tr, (k, v)| tr.with_extra(k, v)))
    }
}

impl<E, P> Sampler for EnvSampler<E, P>
where
    E: Env,
    P: Policy,
{
    type Policy = P;

    fn sample(&mut self) -> Result<SampleBatch> {
        let transitions = (0..self.rollout_fragment_length)
            .map(|_| self.step())
            .collect::<Result<Vec<_>>>()?;
        SampleBatch::from_transitions(&transitions)
    }

    fn rollout_fragment_length(&self) -> usize {
        self.rollout_fragment_length
    }

    fn policy(&self) -> &P {
        &self.policy
    }

    fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    fn set_global_vars(&mut self, vars: &GlobalVars) {
        debug!("Set timestep of the sampler to {}", vars.timestep);
        self.timestep = vars.timestep;
    }

    fn episode_metrics(&mut self) -> Record {
        let n = self.completed.len();
        let mut record = Record::from_scalar("episodes_this_iter", n as f32);
        if n == 0 {
            return record;
        }

        let returns = self.completed.iter().map(|(r, _)| *r).collect::<Vec<_>>();
        let lens = self.completed.iter().map(|(_, l)| *l as f32).collect::<Vec<_>>();
        let mean = |vs: &[f32]| vs.iter().sum::<f32>() / vs.len() as f32;
        record.insert("episode_reward_mean", RecordValue::Scalar(mean(&returns)));
        record.insert(
            "episode_reward_min",
            RecordValue::Scalar(returns.iter().copied().fold(f32::INFINITY, f32::min)),
        );
        record.insert(
            "episode_reward_max",
            RecordValue::Scalar(returns.iter().copied().fold(f32::NEG_INFINITY, f32::max)),
        );
        record.insert("episode_len_mean", RecordValue::Scalar(mean(&lens)));
        self.completed.clear();
        record
    }
}
