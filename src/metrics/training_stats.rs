//! Episode statistics for training and evaluation runs
//!
//! This module tracks episode rewards, move counts and scores with rolling
//! windows, plus the best score seen over the whole run.

use std::collections::VecDeque;

/// Episode statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use qsnake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// // Record an episode
/// stats.record_episode(15.5, 150, 5);
///
/// println!("Mean score: {}", stats.mean_episode_score());
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Moves per episode (rolling window)
    episode_moves: VecDeque<usize>,

    /// Episode scores, snake length gained (rolling window)
    episode_scores: VecDeque<i32>,

    /// Best score over all recorded episodes
    best_score: Option<i32>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of moves played
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new statistics tracker
    ///
    /// # Arguments
    ///
    /// * `window_size` - Number of recent episodes to keep for rolling averages
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_moves: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            best_score: None,
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    ///
    /// # Arguments
    ///
    /// * `reward` - Total reward accumulated during the episode
    /// * `moves` - Number of moves played in the episode
    /// * `score` - Final score (may be negative after red apples)
    ///
    /// # Example
    ///
    /// ```rust
    /// use qsnake::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_episode(15.5, 150, 5);
    ///
    /// assert_eq!(stats.total_episodes(), 1);
    /// assert_eq!(stats.total_steps(), 150);
    /// ```
    pub fn record_episode(&mut self, reward: f32, moves: usize, score: i32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_moves, moves, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.best_score = Some(self.best_score.map_or(score, |best| best.max(score)));
        self.total_episodes += 1;
        self.total_steps += moves;
    }

    /// Mean episode reward over the rolling window, 0.0 when empty
    pub fn mean_episode_reward(&self) -> f32 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
        }
    }

    /// Mean moves per episode over the rolling window
    pub fn mean_episode_moves(&self) -> f32 {
        let sum: usize = self.episode_moves.iter().sum();
        if self.episode_moves.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_moves.len() as f32
        }
    }

    /// Mean episode score over the rolling window
    pub fn mean_episode_score(&self) -> f32 {
        let sum: i32 = self.episode_scores.iter().sum();
        if self.episode_scores.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_scores.len() as f32
        }
    }

    pub fn best_score(&self) -> Option<i32> {
        self.best_score
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    ///
    /// ```text
    /// Episodes: 1 | Steps: 150 | Reward: 15.50 | Score: 5.00 | Best: 5 | Moves: 150.0
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Best: {} | Moves: {:.1}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.best_score.unwrap_or(0),
            self.mean_episode_moves(),
        )
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
        assert_eq!(stats.best_score(), None);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(10.0, 50, 3);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert!((stats.mean_episode_reward() - 10.0).abs() < 1e-5);
        assert!((stats.mean_episode_moves() - 50.0).abs() < 1e-5);
        assert!((stats.mean_episode_score() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_episode(1.0, 10, 1);
        stats.record_episode(2.0, 20, 2);
        stats.record_episode(3.0, 30, 3);

        assert_eq!(stats.total_episodes(), 3);
        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-5);

        // A 4th episode evicts the first
        stats.record_episode(4.0, 40, 4);

        assert_eq!(stats.total_episodes(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-5);
        assert_eq!(stats.total_steps(), 100);
    }

    #[test]
    fn test_negative_scores() {
        let mut stats = TrainingStats::new(10);
        stats.record_episode(-520.0, 12, -2);
        stats.record_episode(-510.0, 8, -1);

        assert!((stats.mean_episode_score() - -1.5).abs() < 1e-5);
        assert_eq!(stats.best_score(), Some(-1));
    }

    #[test]
    fn test_best_score_outlives_window() {
        let mut stats = TrainingStats::new(1);
        stats.record_episode(0.0, 10, 7);
        stats.record_episode(0.0, 10, 1);

        assert!((stats.mean_episode_score() - 1.0).abs() < 1e-5);
        assert_eq!(stats.best_score(), Some(7));
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(15.5, 150, 5);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 150"));
        assert!(summary.contains("Reward: 15.50"));
        assert!(summary.contains("Score: 5.00"));
        assert!(summary.contains("Best: 5"));
        assert!(summary.contains("Moves: 150.0"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_episode_moves(), 0.0);
        assert_eq!(stats.mean_episode_score(), 0.0);
    }
}
