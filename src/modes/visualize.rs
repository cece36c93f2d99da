//! Visualization mode for inspecting and watching trained agents
//!
//! Loading a model prints its metadata, how much of the state space it has
//! learned about, and every learned state with its label and action values.
//! [`VisualizeMode::run`] then shows the greedy agent playing in the terminal.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit
//!
//! # Example
//!
//! ```rust,no_run
//! use qsnake::modes::VisualizeMode;
//! use std::path::Path;
//!
//! # async fn watch() -> anyhow::Result<()> {
//! let mut visualize_mode = VisualizeMode::new(Path::new("models/snake"))?;
//! visualize_mode.print_summary();
//! visualize_mode.run().await?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::time::Duration;
use tokio::time::{Interval, interval};

use crate::game::SnakeGame;
use crate::input::{InputHandler, KeyAction, Speed};
use crate::render::terminal::{TuiTerminal, restore_terminal, setup_terminal};
use crate::render::{Hud, Renderer};
use crate::rl::{
    ModelMetadata, QLearningConfig, QTable, StateFeaturizer, format_action_values, load_model,
};

/// Visualization mode for watching trained agents
pub struct VisualizeMode {
    q_table: QTable,
    metadata: ModelMetadata,
    featurizer: Box<dyn StateFeaturizer>,

    /// Game the agent is currently playing
    game: SnakeGame<StdRng>,

    renderer: Renderer,
    input_handler: InputHandler,

    should_quit: bool,
    paused: bool,
    speed: Speed,

    /// Number of episodes completed
    episode_count: usize,

    /// Episodes restart after this many moves
    max_moves: usize,
}

impl VisualizeMode {
    /// Load the model in `model_dir` and set up a first game
    pub fn new(model_dir: &Path) -> Result<Self> {
        let (q_table, metadata) = load_model(model_dir)
            .with_context(|| format!("Failed to load model from {:?}", model_dir))?;
        let featurizer = metadata.featurizer.build(&metadata.game);
        let game = SnakeGame::new(metadata.game.clone(), StdRng::from_entropy())?;

        Ok(Self {
            renderer: Renderer::new(metadata.game.board_size),
            input_handler: InputHandler::new(),
            q_table,
            featurizer,
            game,
            metadata,
            should_quit: false,
            paused: false,
            speed: Speed::Normal,
            episode_count: 0,
            max_moves: QLearningConfig::default().max_moves,
        })
    }

    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    /// Print model information, learning progress and the learned states
    pub fn print_summary(&self) {
        let rule = "=".repeat(60);
        println!("{rule}");
        println!("Loaded Model Information");
        println!("{rule}");
        println!("Featurizer: {}", self.metadata.featurizer.as_str());
        println!("Episodes trained: {}", self.metadata.episodes_trained);
        println!("Training steps: {}", self.metadata.training_steps);
        println!("Epsilon: {:.4}", self.metadata.epsilon);
        println!(
            "Board: {0}x{0}, {1} green / {2} red apples",
            self.metadata.game.board_size,
            self.metadata.game.green_apples,
            self.metadata.game.red_apples
        );
        println!("Version: {}", self.metadata.version);
        println!("{}", self.q_table.coverage().format_summary());
        println!("{rule}");
        for line in self.table_lines() {
            println!("{line}");
        }
        println!("{rule}");
        println!();
    }

    /// One line per state with any learned value
    pub fn table_lines(&self) -> Vec<String> {
        (0..self.q_table.state_count())
            .filter(|&state| self.q_table.row(state).iter().any(|&v| v != 0.0))
            .map(|state| {
                format!(
                    "{:>5} {:<60} {}",
                    state,
                    self.featurizer.describe(state),
                    format_action_values(&self.q_table, state)
                )
            })
            .collect()
    }

    /// Run the visualization loop
    ///
    /// Sets up the terminal, runs the main visualization loop, and cleans up
    /// on exit.
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;

        let result = self.run_visualization_loop(&mut terminal).await;

        restore_terminal(&mut terminal)?;

        result
    }

    async fn run_visualization_loop(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks based on speed
        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        if self.game.is_over() || self.game.history().len() > self.max_moves {
                            // Auto-restart
                            self.reset_episode()?;
                        } else {
                            self.step_agent();
                        }
                    }
                }

                _ = render_timer.tick() => {
                    let snapshot = self.game.snapshot();
                    let hud = self.hud();
                    let footer = self.footer();
                    let renderer = &self.renderer;
                    terminal.draw(|frame| {
                        renderer.render(frame, &snapshot, &hud, &footer);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Take the greedy action for the current state and move once
    fn step_agent(&mut self) {
        let state = self.featurizer.state_index(&self.game.snapshot());
        self.game.apply(self.q_table.greedy_action(state));
        self.game.step();
    }

    fn reset_episode(&mut self) -> Result<()> {
        self.game = SnakeGame::new(self.metadata.game.clone(), StdRng::from_entropy())?;
        self.episode_count += 1;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => self.should_quit = true,
                KeyAction::Pause => self.paused = !self.paused,
                KeyAction::Restart => self.reset_episode()?,
                KeyAction::Speed(speed) => self.change_speed(speed, tick_timer),
                KeyAction::Steer(_) | KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn change_speed(&mut self, new_speed: Speed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        *tick_timer = interval(self.speed.tick_interval());
    }

    /// Board overlay: episode, current state label and its action values
    fn hud(&self) -> Hud {
        let state = self.featurizer.state_index(&self.game.snapshot());
        let mut hud = Hud::new(format!("Visualize - episode {}", self.episode_count + 1));
        hud.score = self.game.score();
        hud.moves = self.game.history().len() - 1;
        hud.lines = vec![
            format!("State {state}: {}", self.featurizer.describe(state)),
            format_action_values(&self.q_table, state),
        ];
        hud.game_over = self.game.terminal_result().map(|result| result.outcome);
        hud
    }

    fn footer(&self) -> String {
        format!(
            "Speed: {}{} | 1-4 speed | Space pause | R reset | Q quit",
            self.speed.as_str(),
            if self.paused { " (paused)" } else { "" }
        )
    }
}
