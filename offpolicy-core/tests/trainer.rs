use anyhow::Result;
use offpolicy_core::{
    dummy::{CountingSampler, DummyPolicy},
    error::OffPolicyError,
    record::{BufferedRecorder, LogRecorder, NullRecorder},
    replay_buffer::ReplayField,
    ExperienceBufferBase, GlobalVars, OffPolicyTrainer, OffPolicyTrainerConfig,
};
use test_log::test;

fn config() -> OffPolicyTrainerConfig {
    OffPolicyTrainerConfig::default()
        .buffer_size(1000)
        .train_batch_size(32)
        .seed(42)
}

#[test]
fn test_warmup_fills_buffer_without_learning() -> Result<()> {
    let config = config().learning_starts(100);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(1))?;

    let n = trainer.sample_until_learning_starts()?;
    assert_eq!(n, 100);
    assert_eq!(trainer.sampler().n_sample_calls, 100);
    assert_eq!(trainer.tracker().num_steps_sampled, 100);
    assert_eq!(trainer.tracker().num_steps_trained, 0);
    assert_eq!(trainer.replay_buffer().len(), 100);
    assert_eq!(trainer.global_vars().timestep, 100);
    assert_eq!(
        trainer.sampler().global_vars,
        vec![GlobalVars { timestep: 100 }]
    );
    assert_eq!(trainer.policy().n_learn_calls(), 0);

    Ok(())
}

#[test]
fn test_warmup_runs_once() -> Result<()> {
    let config = config().learning_starts(100);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(1))?;

    let result = trainer.train()?;
    assert_eq!(result.warmup_timesteps, 100);
    assert_eq!(result.timesteps_this_iter, 1);
    assert_eq!(result.tracker.num_steps_sampled, 101);
    assert_eq!(result.tracker.num_steps_trained, 32);
    assert_eq!(trainer.sampler().n_sample_calls, 101);

    let result = trainer.train()?;
    assert_eq!(result.warmup_timesteps, 0);
    assert_eq!(result.tracker.num_steps_sampled, 102);
    assert_eq!(result.tracker.num_steps_trained, 64);
    assert_eq!(trainer.sampler().global_vars.len(), 1);
    assert_eq!(trainer.iteration(), 2);

    Ok(())
}

#[test]
fn test_no_warmup_no_broadcast() -> Result<()> {
    let mut trainer = OffPolicyTrainer::build(config(), CountingSampler::new(1))?;

    assert_eq!(trainer.sample_until_learning_starts()?, 0);
    assert!(trainer.sampler().global_vars.is_empty());

    let result = trainer.train()?;
    assert_eq!(result.warmup_timesteps, 0);
    assert_eq!(result.tracker.num_steps_sampled, 1);
    assert_eq!(trainer.policy().batch_sizes, vec![32]);
    assert!(trainer.sampler().global_vars.is_empty());

    Ok(())
}

#[test]
fn test_warmup_overshoots_by_fragment() -> Result<()> {
    let config = config().learning_starts(10).rollout_fragment_length(3);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(3))?;

    let result = trainer.train()?;
    assert_eq!(result.warmup_timesteps, 12);
    assert_eq!(result.timesteps_this_iter, 3);
    assert_eq!(result.tracker.num_steps_sampled, 15);
    assert_eq!(result.tracker.num_steps_trained, 3 * 32);
    assert_eq!(trainer.sampler().global_vars, vec![GlobalVars { timestep: 12 }]);

    Ok(())
}

#[test]
fn test_one_learning_step_per_sampled_step() -> Result<()> {
    let config = config().rollout_fragment_length(4);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(4))?;

    let result = trainer.train()?;
    assert_eq!(result.timesteps_this_iter, 4);
    assert_eq!(trainer.policy().batch_sizes, vec![32; 4]);
    assert_eq!(trainer.policy().n_before_replay_steps, 1);
    assert_eq!(result.tracker.num_steps_trained, 4 * 32);

    Ok(())
}

#[test]
fn test_timesteps_per_iteration() -> Result<()> {
    let config = config()
        .rollout_fragment_length(2)
        .timesteps_per_iteration(5);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(2))?;

    let result = trainer.train()?;
    assert_eq!(trainer.sampler().n_sample_calls, 3);
    assert_eq!(result.timesteps_this_iter, 6);
    assert_eq!(trainer.policy().n_learn_calls(), 6);
    assert_eq!(trainer.policy().n_before_replay_steps, 3);

    Ok(())
}

#[test]
fn test_stats_keep_last_value() -> Result<()> {
    let config = config().rollout_fragment_length(3);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(3))?;

    let result = trainer.train()?;
    // Three learning steps report learn_calls = 1, 2, 3; only the last is kept.
    assert_eq!(result.stats.get_scalar("learn_calls")?, 3.0);
    assert_eq!(result.stats.get_scalar("epsilon")?, 1.0);

    Ok(())
}

#[test]
fn test_invalid_config() {
    let configs = [
        config().num_workers(1),
        config().rollout_fragment_length(0),
        config().train_batch_size(0),
        config().buffer_size(0),
    ];

    for config in configs {
        let err = OffPolicyTrainer::build(config, CountingSampler::new(1))
            .err()
            .expect("configuration should be rejected");
        assert!(matches!(
            err.downcast_ref::<OffPolicyError>(),
            Some(OffPolicyError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_policy_error_propagates() -> Result<()> {
    let sampler = CountingSampler::with_policy(DummyPolicy::new().fail_at(2), 1);
    let mut trainer = OffPolicyTrainer::build(config(), sampler)?;

    trainer.train()?;
    let err = trainer.train().err().expect("second learning step should fail");
    assert_eq!(err.to_string(), "learning step 2 failed");
    assert_eq!(trainer.iteration(), 1);

    Ok(())
}

#[test]
fn test_replay_buffer_keeps_latest_transitions() -> Result<()> {
    let config = config().buffer_size(5).learning_starts(10).train_batch_size(64);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(1))?;

    let result = trainer.train()?;
    assert_eq!(trainer.replay_buffer().len(), 5);

    // Labels 0..=10 were sampled; the buffer holds 6..=10.
    assert!(result.stats.get_scalar("batch_reward_mean")? >= 6.0);
    for ix in 0..5 {
        let tr = trainer.replay_buffer().get(ix).expect("slot is filled");
        let label = tr.obs().expect("obs is stored")[0];
        assert!(label >= 6.0);
        assert_eq!(tr.reward(), Some(label));
        assert_eq!(tr.new_obs(), Some(&[label + 1.0][..]));
    }

    Ok(())
}

#[test]
fn test_extra_fields_are_stored() -> Result<()> {
    let config = config().extra_field(ReplayField::new("action_logp", &[1]));
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(1))?;
    trainer.train()?;

    let tr = trainer.replay_buffer().get(0).expect("slot is filled");
    assert_eq!(tr.get("action_logp"), Some(&[0.0][..]));

    let mut trainer = OffPolicyTrainer::build(self::config(), CountingSampler::new(1))?;
    trainer.train()?;

    let tr = trainer.replay_buffer().get(0).expect("slot is filled");
    assert_eq!(tr.get("action_logp"), None);

    Ok(())
}

#[test]
fn test_run_stores_and_flushes() -> Result<()> {
    let config = config().flush_interval(2);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(1))?;
    let mut recorder = BufferedRecorder::new();

    trainer.run(5, &mut recorder)?;
    assert_eq!(recorder.len(), 5);
    assert_eq!(recorder.n_flushes(), 3);

    let last = recorder.iter().last().expect("records are stored");
    assert_eq!(last.get_scalar("training_iteration")?, 5.0);
    assert_eq!(last.get_scalar("num_steps_sampled")?, 5.0);
    assert_eq!(last.get_scalar("num_steps_trained")?, 5.0 * 32.0);
    assert!(last.get("timestamp").is_some());

    Ok(())
}

#[test]
fn test_run_with_other_recorders() -> Result<()> {
    let mut trainer = OffPolicyTrainer::build(config(), CountingSampler::new(1))?;

    trainer.run(2, &mut LogRecorder::new())?;
    trainer.run(0, &mut NullRecorder::new())?;
    trainer.run(1, &mut NullRecorder::new())?;
    assert_eq!(trainer.iteration(), 3);
    assert_eq!(trainer.tracker().num_steps_sampled, 3);

    Ok(())
}

#[test]
fn test_sampler_fragment_length_mismatch() -> Result<()> {
    let err = OffPolicyTrainer::build(config(), CountingSampler::new(5))
        .err()
        .expect("sampler returning 5 steps should be rejected");
    assert!(matches!(
        err.downcast_ref::<OffPolicyError>(),
        Some(OffPolicyError::InvalidConfig(_))
    ));

    let config = config().rollout_fragment_length(5);
    let mut trainer = OffPolicyTrainer::build(config, CountingSampler::new(5))?;
    let result = trainer.train()?;
    assert_eq!(result.timesteps_this_iter, 5);
    assert_eq!(trainer.policy().n_learn_calls(), 5);

    Ok(())
}
