//! Train a model, reload it, test it with saved replays and step through one

use qsnake::game::{GameConfig, load_history};
use qsnake::modes::{EvaluateConfig, EvaluateMode, ReplayMode, TrainConfig, TrainMode};
use qsnake::render::NullPresenter;
use qsnake::rl::{FeaturizerKind, load_model, model_dir, model_exists};
use tempfile::TempDir;

#[test]
fn test_train_evaluate_and_replay() {
    let temp_dir = TempDir::new().unwrap();
    let dir = model_dir(temp_dir.path(), "agent");

    let mut config = TrainConfig::new(50, dir.clone());
    config.game_config = GameConfig::new(8);
    config.featurizer = FeaturizerKind::Danger;
    config.learning.max_moves = 150;
    config.checkpoint_frequency = 25;
    config.seed = Some(11);
    config.verbose = false;

    let mut train_mode = TrainMode::new(config).unwrap();
    train_mode.run(&mut NullPresenter).unwrap();
    assert!(model_exists(&dir));

    let (table, metadata) = load_model(&dir).unwrap();
    assert_eq!(metadata.featurizer, FeaturizerKind::Danger);
    assert_eq!(metadata.game.board_size, 8);
    assert_eq!(metadata.episodes_trained, 50);
    assert_eq!(table.state_count(), 8);
    assert!(metadata.epsilon < 1.0);

    let replays = temp_dir.path().join("replays");
    let mut eval_config = EvaluateConfig::new(dir.clone(), 2);
    eval_config.replay_dir = Some(replays.clone());
    eval_config.learning.max_moves = 60;
    eval_config.seed = Some(12);

    let mut evaluate_mode = EvaluateMode::new(eval_config).unwrap();
    assert_eq!(evaluate_mode.game_config().board_size, 8);
    evaluate_mode.run(&mut NullPresenter).unwrap();
    assert_eq!(evaluate_mode.stats().total_episodes(), 2);

    let replay_path = replays.join("game_1.json");
    let frames = load_history(&replay_path).unwrap().len();

    // The model's own board size wins over the one passed in
    let mut replay_mode = ReplayMode::new(&replay_path, Some(dir), GameConfig::default()).unwrap();
    assert_eq!(replay_mode.board_size(), 8);
    assert_eq!(replay_mode.frame_count(), frames);
    assert_eq!(replay_mode.run(&mut NullPresenter).unwrap(), frames);
}

#[test]
fn test_resume_continues_from_saved_model() {
    let temp_dir = TempDir::new().unwrap();
    let dir = model_dir(temp_dir.path(), "agent");

    let mut config = TrainConfig::new(10, dir.clone());
    config.learning.max_moves = 100;
    config.seed = Some(3);
    config.verbose = false;
    TrainMode::new(config.clone())
        .unwrap()
        .run(&mut NullPresenter)
        .unwrap();

    // A resumed run ignores a different board size and featurizer
    config.resume = true;
    config.game_config = GameConfig::new(6);
    config.featurizer = FeaturizerKind::HeadPosition;
    let mut resumed = TrainMode::new(config).unwrap();
    assert_eq!(resumed.game_config().board_size, 10);
    resumed.run(&mut NullPresenter).unwrap();

    let (_, metadata) = load_model(&dir).unwrap();
    assert_eq!(metadata.episodes_trained, 20);
    assert_eq!(metadata.featurizer, FeaturizerKind::LineOfSight);
}
