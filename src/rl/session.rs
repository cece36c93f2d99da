use rand::Rng;

use super::config::QLearningConfig;
use super::q_table::QTable;
use crate::game::{Action, StepResult};

/// Everything a training run carries from one episode to the next
///
/// Owns the value table, the current exploration rate and the episode/step
/// counters. Saved with the model so training can be resumed.
#[derive(Debug, Clone)]
pub struct TrainingSession {
    q_table: QTable,
    config: QLearningConfig,
    epsilon: f32,
    episodes_trained: usize,
    training_steps: usize,
}

impl TrainingSession {
    /// Fresh session with a zeroed table of `state_count` rows
    pub fn new(config: QLearningConfig, state_count: usize) -> Self {
        Self {
            q_table: QTable::new(state_count),
            epsilon: config.epsilon_start,
            config,
            episodes_trained: 0,
            training_steps: 0,
        }
    }

    /// Continue from a previously saved table and counters
    pub fn resume(
        config: QLearningConfig,
        q_table: QTable,
        epsilon: f32,
        episodes_trained: usize,
        training_steps: usize,
    ) -> Self {
        Self {
            q_table,
            epsilon: epsilon.clamp(config.epsilon_min, 1.0),
            config,
            episodes_trained,
            training_steps,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    pub fn training_steps(&self) -> usize {
        self.training_steps
    }

    /// Epsilon-greedy action selection
    pub fn choose_action<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> Action {
        if rng.gen_range(0.0..1.0) < self.epsilon {
            Action::ALL[rng.gen_range(0..Action::COUNT)]
        } else {
            self.q_table.greedy_action(state)
        }
    }

    /// Learn from one transition and return the reward it earned
    pub fn learn(
        &mut self,
        state: usize,
        action: Action,
        result: StepResult,
        next_state: Option<usize>,
    ) -> f32 {
        let reward = self.config.rewards.reward(result);
        self.q_table.update(
            state,
            action,
            reward,
            next_state,
            self.config.alpha,
            self.config.gamma,
        );
        self.training_steps += 1;
        reward
    }

    /// Count the episode and decay epsilon towards its floor
    pub fn finish_episode(&mut self) {
        self.episodes_trained += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }
}
