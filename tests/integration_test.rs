use tdqn::{
    agent::TargetNetworks,
    config::TdqnConfig,
    env::{CartPole, Environment},
    error::TdqnError,
    metrics::ScoreTracker,
    trainer::{RunOutcome, Trainer},
};
use ndarray::Array2;

fn quick_config(dir: &std::path::Path) -> TdqnConfig {
    TdqnConfig {
        episodes: 5,
        max_episode_steps: 200,
        memory_size: 200,
        batch_size: 16,
        train_start: 32,
        hidden_layers: vec![24, 24],
        seed: Some(3),
        checkpoint_dir: dir.join("Models"),
        plot_dir: None,
        ..TdqnConfig::default()
    }
}

#[test]
fn test_end_to_end_cartpole_training() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path());
    let run_checkpoint = config.run_checkpoint_path();

    let mut trainer = Trainer::cartpole(config.clone()).unwrap();
    let summary = trainer.run().unwrap();

    let history = &summary.history;
    assert!(!history.scores.is_empty());
    assert!(history.scores.len() <= 5);
    assert!(history.scores.iter().all(|&s| (1..=200).contains(&s)));
    assert_eq!(history.averages.len(), history.scores.len());
    assert!(history.epsilons.iter().all(|&e| (0.01..=1.0).contains(&e)));

    match summary.outcome {
        RunOutcome::Exhausted { checkpoint } => {
            assert_eq!(checkpoint, run_checkpoint);
            assert!(checkpoint.exists());
        }
        RunOutcome::Solved { checkpoint, .. } => {
            assert_eq!(checkpoint, config.solved_checkpoint_path());
            assert!(checkpoint.exists());
        }
    }

    // Every recorded transition keeps the observation shape
    let agent = trainer.agent();
    assert!(agent.memory.iter().all(|t| t.state.len() == 4 && t.next_state.len() == 4));
    // Only early failures carry the penalty
    assert!(agent.memory.iter().all(|t| t.reward == 1.0 || (t.reward == -100.0 && t.done)));
}

#[test]
fn test_checkpoint_round_trip_through_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let config = TdqnConfig {
        target_networks: TargetNetworks::Single,
        soft_update: true,
        ..quick_config(dir.path())
    };
    let mut trainer = Trainer::cartpole(config.clone()).unwrap();
    let summary = trainer.run().unwrap();
    let checkpoint = match summary.outcome {
        RunOutcome::Exhausted { checkpoint } | RunOutcome::Solved { checkpoint, .. } => checkpoint,
    };

    let mut evaluator = Trainer::cartpole(TdqnConfig { seed: Some(11), ..config }).unwrap();
    evaluator.agent_mut().load(&checkpoint).unwrap();

    let probe = Array2::from_shape_vec((2, 4), vec![0.01, 0.0, -0.02, 0.03, 0.04, -0.01, 0.0, 0.02]).unwrap();
    assert_eq!(
        evaluator.agent().online.predict(probe.view()).unwrap(),
        trainer.agent().online.predict(probe.view()).unwrap()
    );

    let scores = evaluator.evaluate(3).unwrap();
    assert_eq!(scores.len(), 3);
    assert!(scores.iter().all(|&s| (1..=200).contains(&s)));
    assert!(evaluator.agent().memory.is_empty());
}

#[test]
fn test_cartpole_respects_step_cap() {
    let mut env = CartPole::default();
    env.set_max_episode_steps(4000);
    assert_eq!(env.max_episode_steps(), 4000);

    env.reset(Some(0));
    let mut steps = 0;
    loop {
        // Alternate pushes keep the pole up for a while but not forever
        let step = env.step(steps % 2).unwrap();
        steps += 1;
        if step.done() {
            assert!(step.terminated != step.truncated);
            if step.truncated {
                assert_eq!(steps, 4000);
            }
            break;
        }
    }
    assert!(steps <= 4000);
}

#[test]
fn test_running_average() {
    let mut tracker = ScoreTracker::new();
    assert_eq!(tracker.end_episode(0, 10, 1.0), 10.0);
    assert_eq!(tracker.end_episode(1, 20, 0.9), 15.0);
    assert_eq!(tracker.end_episode(2, 30, 0.8), 20.0);
    assert_eq!(tracker.average(), Some(20.0));
    assert_eq!(tracker.history().scores, vec![10, 20, 30]);
}

#[test]
fn test_config_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = TdqnConfig {
        episodes: 123,
        soft_update: true,
        target_networks: TargetNetworks::Single,
        ..TdqnConfig::default()
    };
    config.save(&path).unwrap();
    assert_eq!(TdqnConfig::from_file(&path).unwrap(), config);

    // Missing fields fall back to defaults
    std::fs::write(&path, r#"{ "episodes": 7 }"#).unwrap();
    let partial = TdqnConfig::from_file(&path).unwrap();
    assert_eq!(partial.episodes, 7);
    assert_eq!(partial.memory_size, 2000);
    assert_eq!(partial.max_episode_steps, 4000);
}

#[test]
fn test_config_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "gamma": 1.5 }"#).unwrap();
    assert!(matches!(TdqnConfig::from_file(&path), Err(TdqnError::InvalidParameter { .. })));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(TdqnConfig::from_file(&path), Err(TdqnError::SerializationError(_))));

    let never_learns = TdqnConfig {
        train_start: 3000,
        ..TdqnConfig::default()
    };
    assert!(never_learns.validate().is_err());
}

#[test]
fn test_default_hyperparameters() {
    let config = TdqnConfig::default();
    assert_eq!(config.memory_size, 2000);
    assert_eq!(config.batch_size, 32);
    assert_eq!(config.train_start, 1000);
    assert_eq!(config.gamma, 0.95);
    assert_eq!(config.epsilon_decay, 0.999);
    assert_eq!(config.epsilon_min, 0.01);
    assert_eq!(config.learning_rate, 0.00025);
    assert_eq!(config.hidden_layers, vec![512, 256, 64]);
    assert_eq!(config.tau, 0.1);
    assert_eq!(config.solved_checkpoint_path(), std::path::PathBuf::from("Models/cartpole-tdqn.bin"));
    assert_eq!(config.run_checkpoint_path(), std::path::PathBuf::from("Models/TDQN_CartPole-v1.bin"));
    assert!(config.validate().is_ok());
}
