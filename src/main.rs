use anyhow::Result;
use clap::{Parser, Subcommand};
use qsnake::config::RunConfig;
use qsnake::input::Speed;
use qsnake::modes::{
    EvaluateConfig, EvaluateMode, PlayMode, ReplayMode, TrainConfig, TrainMode, VisualizeMode,
};
use qsnake::render::{NullPresenter, Presenter, TerminalPresenter};
use qsnake::rl::{FeaturizerKind, model_dir};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qsnake")]
#[command(version, about = "Snake with red and green apples, played by you or by a Q-learning agent")]
struct Cli {
    /// Directory holding one subdirectory per model
    #[arg(long, default_value = "models", global = true)]
    models_dir: PathBuf,

    /// JSON file with game and learning settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Board side length (overrides the config file)
    #[arg(long, global = true)]
    board_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play snake with keyboard controls
    Play,

    /// Train a Q-learning agent
    Train {
        /// Model name, saved under the models directory
        #[arg(long)]
        model: String,

        /// Number of training episodes
        #[arg(long, default_value = "10000")]
        episodes: usize,

        /// State abstraction for a new model
        #[arg(long, value_enum, default_value_t = FeaturizerKind::LineOfSight)]
        featurizer: FeaturizerKind,

        /// Continue training the saved model
        #[arg(long)]
        resume: bool,

        #[arg(long)]
        seed: Option<u64>,

        /// Train without the terminal UI
        #[arg(long)]
        no_ui: bool,
    },

    /// Play a trained model greedily and report its scores
    Test {
        #[arg(long)]
        model: String,

        #[arg(long, default_value = "10")]
        games: usize,

        /// Save every game to the replays directory
        #[arg(long)]
        save: bool,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        no_ui: bool,
    },

    /// Step through a recorded game
    Replay {
        /// Game history JSON file
        file: PathBuf,

        /// Show the model's view of each frame
        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        no_ui: bool,
    },

    /// Inspect a trained model and watch it play
    Visualize {
        #[arg(long)]
        model: String,

        /// Only print the model summary
        #[arg(long)]
        no_ui: bool,
    },
}

impl Command {
    fn uses_ui(&self) -> bool {
        match self {
            Command::Play => true,
            Command::Train { no_ui, .. }
            | Command::Test { no_ui, .. }
            | Command::Replay { no_ui, .. }
            | Command::Visualize { no_ui, .. } => !no_ui,
        }
    }
}

fn init_tracing(ui: bool) {
    // Logs go to stderr; keep them quiet under the TUI unless RUST_LOG asks otherwise
    let default_level = if ui { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn presenter(ui: bool, board_size: usize, speed: Speed) -> Result<Box<dyn Presenter>> {
    if ui {
        Ok(Box::new(TerminalPresenter::spectator(board_size, speed)?))
    } else {
        Ok(Box::new(NullPresenter))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.uses_ui());

    let mut run_config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(board_size) = cli.board_size {
        run_config.game.board_size = board_size;
    }
    run_config.validate()?;

    match cli.command {
        Command::Play => {
            let mut presenter = TerminalPresenter::player(run_config.game.board_size)?;
            let mut play_mode = PlayMode::new(run_config.game, PathBuf::from("game_history.json"));
            play_mode.run(&mut presenter, &mut StdRng::from_entropy())?;
            println!("{}", play_mode.metrics().format_summary());
            println!("Last game saved to game_history.json");
        }
        Command::Train {
            model,
            episodes,
            featurizer,
            resume,
            seed,
            no_ui,
        } => {
            let mut config = TrainConfig::new(episodes, model_dir(&cli.models_dir, &model));
            config.featurizer = featurizer;
            config.game_config = run_config.game;
            config.learning = run_config.learning;
            config.resume = resume;
            config.seed = seed;
            config.verbose = no_ui;

            let mut train_mode = TrainMode::new(config)?;
            let board_size = train_mode.game_config().board_size;
            let mut presenter = presenter(!no_ui, board_size, Speed::VeryFast)?;
            train_mode.run(presenter.as_mut())?;
        }
        Command::Test {
            model,
            games,
            save,
            seed,
            no_ui,
        } => {
            let mut config = EvaluateConfig::new(model_dir(&cli.models_dir, &model), games);
            config.learning = run_config.learning;
            config.seed = seed;
            if save {
                config.replay_dir = Some(PathBuf::from("replays"));
            }

            let mut evaluate_mode = EvaluateMode::new(config)?;
            let board_size = evaluate_mode.game_config().board_size;
            let mut presenter = presenter(!no_ui, board_size, Speed::Fast)?;
            evaluate_mode.run(presenter.as_mut())?;
        }
        Command::Replay { file, model, no_ui } => {
            let model = model.map(|name| model_dir(&cli.models_dir, &name));
            let mut replay_mode =
                ReplayMode::new(&file, model, run_config.game)?.with_printed_frames(no_ui);
            let mut presenter = presenter(!no_ui, replay_mode.board_size(), Speed::Normal)?;
            let shown = replay_mode.run(presenter.as_mut())?;
            println!("Replayed {} of {} frames", shown, replay_mode.frame_count());
        }
        Command::Visualize { model, no_ui } => {
            let mut visualize_mode = VisualizeMode::new(&model_dir(&cli.models_dir, &model))?
                .with_max_moves(run_config.learning.max_moves);
            visualize_mode.print_summary();
            if !no_ui {
                visualize_mode.run().await?;
            }
        }
    }

    Ok(())
}
