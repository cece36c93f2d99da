//! Episode driver: plays one game from start to finish with a value table
//!
//! Training episodes pick actions epsilon-greedily and learn from every
//! transition. Evaluation episodes always take the greedy action and leave
//! the table untouched. Both stop when a move fails, when the move cap is
//! reached, or when the presenter asks to quit.

use anyhow::Result;
use rand::Rng;
use tracing::debug;

use super::config::RewardConfig;
use super::featurizer::StateFeaturizer;
use super::q_table::QTable;
use super::session::TrainingSession;
use crate::game::{Action, Outcome, SnakeGame, Snapshot, StepResult};
use crate::render::{Hud, Presenter, SpectatorInput};

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    /// A move failed
    GameOver(Outcome),
    /// The move cap was reached with the snake still alive
    MoveCap,
    /// The presenter asked to stop
    Quit,
}

#[derive(Debug, Clone)]
pub struct EpisodeReport {
    pub score: i32,
    pub length: usize,
    pub moves: usize,
    pub reward: f32,
    pub end: EpisodeEnd,
    /// Every tick of the game, oldest first
    pub history: Vec<Snapshot>,
}

impl EpisodeReport {
    pub fn interrupted(&self) -> bool {
        self.end == EpisodeEnd::Quit
    }
}

/// Decides actions and digests their results
trait Policy {
    fn act(&mut self, state: usize) -> Action;

    /// Returns the reward the transition earned
    fn observe(
        &mut self,
        state: usize,
        action: Action,
        result: StepResult,
        next_state: Option<usize>,
    ) -> f32;

    fn q_table(&self) -> &QTable;
}

struct Explorer<'a, R: ?Sized> {
    session: &'a mut TrainingSession,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Policy for Explorer<'_, R> {
    fn act(&mut self, state: usize) -> Action {
        self.session.choose_action(state, &mut *self.rng)
    }

    fn observe(
        &mut self,
        state: usize,
        action: Action,
        result: StepResult,
        next_state: Option<usize>,
    ) -> f32 {
        self.session.learn(state, action, result, next_state)
    }

    fn q_table(&self) -> &QTable {
        self.session.q_table()
    }
}

struct Greedy<'a> {
    q_table: &'a QTable,
    rewards: &'a RewardConfig,
}

impl Policy for Greedy<'_> {
    fn act(&mut self, state: usize) -> Action {
        self.q_table.greedy_action(state)
    }

    fn observe(&mut self, _: usize, _: Action, result: StepResult, _: Option<usize>) -> f32 {
        self.rewards.reward(result)
    }

    fn q_table(&self) -> &QTable {
        self.q_table
    }
}

pub struct EpisodeDriver<'f> {
    featurizer: &'f dyn StateFeaturizer,
    max_moves: usize,
}

impl<'f> EpisodeDriver<'f> {
    pub fn new(featurizer: &'f dyn StateFeaturizer, max_moves: usize) -> Self {
        Self {
            featurizer,
            max_moves,
        }
    }

    /// Play and learn from one episode
    ///
    /// Epsilon decays once the episode is over, unless it was interrupted.
    pub fn train<G: Rng, R: Rng + ?Sized>(
        &self,
        game: SnakeGame<G>,
        session: &mut TrainingSession,
        rng: &mut R,
        presenter: &mut dyn Presenter,
        title: &str,
    ) -> Result<EpisodeReport> {
        let mut explorer = Explorer {
            session: &mut *session,
            rng,
        };
        let report = self.run(game, &mut explorer, presenter, title)?;
        if !report.interrupted() {
            session.finish_episode();
        }
        Ok(report)
    }

    /// Play one episode greedily without learning
    pub fn evaluate<G: Rng>(
        &self,
        game: SnakeGame<G>,
        q_table: &QTable,
        rewards: &RewardConfig,
        presenter: &mut dyn Presenter,
        title: &str,
    ) -> Result<EpisodeReport> {
        self.run(game, &mut Greedy { q_table, rewards }, presenter, title)
    }

    fn run<G: Rng, P: Policy>(
        &self,
        mut game: SnakeGame<G>,
        policy: &mut P,
        presenter: &mut dyn Presenter,
        title: &str,
    ) -> Result<EpisodeReport> {
        let mut moves = 0;
        let mut reward = 0.0;

        let end = loop {
            let snapshot = game.snapshot();
            let state = self.featurizer.state_index(&snapshot);
            let hud = self.hud(title, game.score(), moves, state, policy.q_table());
            presenter.render(&snapshot, &hud)?;

            match presenter.spectator_input()? {
                SpectatorInput::Quit => break EpisodeEnd::Quit,
                SpectatorInput::Hold => continue,
                SpectatorInput::Step(_) | SpectatorInput::None => {}
            }

            if moves >= self.max_moves {
                break EpisodeEnd::MoveCap;
            }

            let action = policy.act(state);
            game.apply(action);
            let result = game.step();
            moves += 1;

            let next_state = result
                .success
                .then(|| self.featurizer.state_index(&game.snapshot()));
            reward += policy.observe(state, action, result, next_state);

            debug!(
                state,
                action = action.label(),
                outcome = result.outcome.as_str(),
                success = result.success,
                "tick"
            );

            if !result.success {
                break EpisodeEnd::GameOver(result.outcome);
            }
        };

        if let EpisodeEnd::GameOver(outcome) = end {
            let mut hud = Hud::new(title);
            hud.score = game.score();
            hud.moves = moves;
            hud.game_over = Some(outcome);
            presenter.render(&game.snapshot(), &hud)?;
        }

        Ok(EpisodeReport {
            score: game.score(),
            length: game.len(),
            moves,
            reward,
            end,
            history: game.into_history(),
        })
    }

    fn hud(&self, title: &str, score: i32, moves: usize, state: usize, q_table: &QTable) -> Hud {
        let mut hud = Hud::new(title);
        hud.score = score;
        hud.moves = moves;
        hud.lines = vec![
            format!("State {state}: {}", self.featurizer.describe(state)),
            format_action_values(q_table, state),
        ];
        hud
    }
}

/// One-line summary of a table row, e.g. `Left -1.00 | Right 0.50 | Straight 2.25`
pub fn format_action_values(q_table: &QTable, state: usize) -> String {
    Action::ALL
        .iter()
        .map(|&action| format!("{} {:.2}", action.label(), q_table.value(state, action)))
        .collect::<Vec<_>>()
        .join(" | ")
}
