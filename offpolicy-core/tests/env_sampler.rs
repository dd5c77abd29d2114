use anyhow::Result;
use offpolicy_core::{
    dummy::{DummyEnv, DummyPolicy},
    error::OffPolicyError,
    EnvSampler, GlobalVars, OffPolicyTrainer, OffPolicyTrainerConfig, Sampler,
};
use test_log::test;

#[test]
fn test_episodes_continue_across_fragments() -> Result<()> {
    let mut sampler = EnvSampler::new(DummyEnv::new(3), DummyPolicy::new(), 4);

    let batch = sampler.sample()?;
    assert_eq!(batch.count(), 4);

    let rows = batch.rows().collect::<Vec<_>>();
    let obs = rows.iter().map(|tr| tr.obs().unwrap()[0]).collect::<Vec<_>>();
    let new_obs = rows.iter().map(|tr| tr.new_obs().unwrap()[0]).collect::<Vec<_>>();
    let dones = rows.iter().map(|tr| tr.done().unwrap()).collect::<Vec<_>>();
    assert_eq!(obs, vec![0.0, 1.0, 2.0, 0.0]);
    assert_eq!(new_obs, vec![1.0, 2.0, 3.0, 1.0]);
    assert_eq!(dones, vec![false, false, true, false]);
    assert!(rows.iter().all(|tr| tr.reward() == Some(1.0)));
    assert_eq!(sampler.env().n_resets, 2);

    // The running episode goes on in the next fragment and ends at its second step.
    let batch = sampler.sample()?;
    assert_eq!(batch.row(0).obs(), Some(&[1.0][..]));
    assert_eq!(batch.row(1).done(), Some(true));
    assert_eq!(batch.row(2).obs(), Some(&[0.0][..]));
    assert_eq!(sampler.env().n_resets, 3);

    Ok(())
}

#[test]
fn test_truncation_is_not_terminal() -> Result<()> {
    let mut sampler = EnvSampler::new(DummyEnv::truncating(2), DummyPolicy::new(), 2);

    let batch = sampler.sample()?;
    assert!(batch.rows().all(|tr| tr.done() == Some(false)));

    let batch = sampler.sample()?;
    assert_eq!(batch.row(0).obs(), Some(&[0.0][..]));
    assert_eq!(sampler.env().n_resets, 2);

    Ok(())
}

#[test]
fn test_action_extras_are_attached() -> Result<()> {
    let mut sampler = EnvSampler::new(DummyEnv::new(10), DummyPolicy::new(), 2);

    let batch = sampler.sample()?;
    let column = batch.column("action_logp").expect("extra field is collected");
    assert_eq!(column.width(), 1);
    assert_eq!(column.rows(), 2);

    Ok(())
}

#[test]
fn test_episode_metrics() -> Result<()> {
    let mut sampler = EnvSampler::new(DummyEnv::new(3), DummyPolicy::new(), 7);
    sampler.sample()?;

    let metrics = sampler.episode_metrics();
    assert_eq!(metrics.get_scalar("episodes_this_iter")?, 2.0);
    assert_eq!(metrics.get_scalar("episode_reward_mean")?, 3.0);
    assert_eq!(metrics.get_scalar("episode_reward_min")?, 3.0);
    assert_eq!(metrics.get_scalar("episode_reward_max")?, 3.0);
    assert_eq!(metrics.get_scalar("episode_len_mean")?, 3.0);

    // Reported episodes are cleared.
    let metrics = sampler.episode_metrics();
    assert_eq!(metrics.get_scalar("episodes_this_iter")?, 0.0);
    assert!(metrics.get("episode_reward_mean").is_none());

    Ok(())
}

#[test]
fn test_global_vars_set_timestep() -> Result<()> {
    let mut sampler = EnvSampler::new(DummyEnv::new(10), DummyPolicy::new(), 2);
    sampler.sample()?;
    assert_eq!(sampler.policy().timesteps, vec![0, 1]);

    sampler.set_global_vars(&GlobalVars { timestep: 100 });
    assert_eq!(sampler.timestep(), 100);

    sampler.sample()?;
    assert_eq!(sampler.policy().timesteps, vec![0, 1, 100, 101]);

    Ok(())
}

#[test]
fn test_train_on_env() -> Result<()> {
    let config = OffPolicyTrainerConfig::default()
        .buffer_size(100)
        .learning_starts(10)
        .train_batch_size(4)
        .rollout_fragment_length(2);
    let sampler = EnvSampler::new(DummyEnv::new(5), DummyPolicy::new(), 2);
    let mut trainer = OffPolicyTrainer::build(config, sampler)?;

    let result = trainer.train()?;
    assert_eq!(result.warmup_timesteps, 10);
    assert_eq!(result.timesteps_this_iter, 2);
    assert_eq!(result.tracker.num_steps_trained, 2 * 4);
    assert_eq!(trainer.sampler().timestep(), 12);
    assert_eq!(trainer.policy().timesteps.last(), Some(&11));

    // Two episodes of length 5 finished during the warm-up.
    assert_eq!(result.episode_metrics.get_scalar("episodes_this_iter")?, 2.0);
    assert_eq!(result.episode_metrics.get_scalar("episode_reward_mean")?, 5.0);

    Ok(())
}

#[test]
fn test_fragment_length_must_match_config() {
    let cases = [(0, 0), (0, 1), (2, 1), (1, 3)];

    for (sampler_len, config_len) in cases {
        let config = OffPolicyTrainerConfig::default().rollout_fragment_length(config_len);
        let sampler = EnvSampler::new(DummyEnv::new(5), DummyPolicy::new(), sampler_len);
        let err = OffPolicyTrainer::build(config, sampler)
            .err()
            .expect("fragment length should be rejected");
        assert!(matches!(
            err.downcast_ref::<OffPolicyError>(),
            Some(OffPolicyError::InvalidConfig(_))
        ));
    }
}
