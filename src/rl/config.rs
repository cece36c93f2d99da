//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

use crate::game::{Outcome, StepResult};

/// Reward policy: maps the result of a move to a scalar reward
///
/// The magnitudes are tunable. Dying on a red apple at length 1 has its own
/// penalty, milder than a wall but harsher than surviving a red apple, so
/// ending the game on a red apple never beats staying alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Hitting a wall, the body, or filling the board
    pub death: f32,
    /// Eating a red apple at length 1
    pub red_death: f32,
    /// Eating a red apple and surviving
    pub red: f32,
    /// Eating a green apple
    pub green: f32,
    /// Any other move
    pub step: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            death: -500.0,
            red_death: -100.0,
            red: -10.0,
            green: 10.0,
            step: -1.0,
        }
    }
}

impl RewardConfig {
    pub fn reward(&self, result: StepResult) -> f32 {
        match (result.success, result.outcome) {
            (false, Outcome::Red) => self.red_death,
            (false, _) => self.death,
            (true, Outcome::Green) => self.green,
            (true, Outcome::Red) => self.red,
            (true, Outcome::Empty) => self.step,
            // The engine never reports a survived collision
            (true, Outcome::Wall | Outcome::SelfCollision) => self.death,
        }
    }
}

/// Configuration for tabular Q-learning and the episode loop
///
/// # Example
///
/// ```rust
/// use qsnake::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     alpha: 0.2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Step size of the temporal-difference update, in (0, 1]
    ///
    /// Default: 0.1
    pub alpha: f32,

    /// Discount factor for future rewards, in [0, 1)
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Exploration rate at the start of training
    ///
    /// Default: 1.0
    pub epsilon_start: f32,

    /// Multiplier applied to epsilon after every episode
    ///
    /// Default: 0.99
    pub epsilon_decay: f32,

    /// Floor below which epsilon never decays
    ///
    /// Default: 0.01
    pub epsilon_min: f32,

    /// Episodes are cut off after this many moves
    ///
    /// Default: 1000
    pub max_moves: usize,

    pub rewards: RewardConfig,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon_start: 1.0,
            epsilon_decay: 0.99,
            epsilon_min: 0.01,
            max_moves: 1000,
            rewards: RewardConfig::default(),
        }
    }
}

impl QLearningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(format!("alpha must be in (0, 1], got {}", self.alpha));
        }

        if !(0.0..1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1), got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            ));
        }

        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(format!(
                "epsilon_min must be in [0, 1], got {}",
                self.epsilon_min
            ));
        }

        if self.epsilon_min > self.epsilon_start {
            return Err(format!(
                "epsilon_min ({}) cannot exceed epsilon_start ({})",
                self.epsilon_min, self.epsilon_start
            ));
        }

        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if self.max_moves == 0 {
            return Err("max_moves must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QLearningConfig::default();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.epsilon_start, 1.0);
        assert_eq!(config.epsilon_decay, 0.99);
        assert_eq!(config.max_moves, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_alpha_out_of_range() {
        let mut config = QLearningConfig::default();
        config.alpha = 0.0;
        assert!(config.validate().is_err());

        config.alpha = 1.5;
        assert!(config.validate().is_err());

        config.alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = QLearningConfig::default();
        config.gamma = 1.0;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_floor_above_start() {
        let mut config = QLearningConfig::default();
        config.epsilon_start = 0.1;
        config.epsilon_min = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_max_moves() {
        let mut config = QLearningConfig::default();
        config.max_moves = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reward_mapping() {
        let rewards = RewardConfig::default();
        assert_eq!(rewards.reward(StepResult::dead(Outcome::Wall)), -500.0);
        assert_eq!(rewards.reward(StepResult::dead(Outcome::SelfCollision)), -500.0);
        assert_eq!(rewards.reward(StepResult::dead(Outcome::Green)), -500.0);
        assert_eq!(rewards.reward(StepResult::dead(Outcome::Red)), -100.0);
        assert_eq!(rewards.reward(StepResult::alive(Outcome::Red)), -10.0);
        assert_eq!(rewards.reward(StepResult::alive(Outcome::Green)), 10.0);
        assert_eq!(rewards.reward(StepResult::alive(Outcome::Empty)), -1.0);
    }

    #[test]
    fn test_red_death_ranks_between_death_and_red() {
        let rewards = RewardConfig::default();
        assert!(rewards.death < rewards.red_death);
        assert!(rewards.red_death < rewards.red);
        // Dying on the red apple costs more than surviving it and then
        // paying fifty step costs
        assert!(rewards.red_death < rewards.red + rewards.step * 50.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: QLearningConfig =
            serde_json::from_str(r#"{"alpha": 0.5, "rewards": {"green": 50.0}}"#).unwrap();
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.rewards.green, 50.0);
        assert_eq!(config.rewards.death, -500.0);
    }
}
