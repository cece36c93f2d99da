use std::time::{Duration, Instant};

use crate::game::Outcome;

/// Running statistics for a human play session
#[derive(Debug, Clone)]
pub struct GameMetrics {
    game_start: Instant,
    /// Time spent in the current game, refreshed by [`GameMetrics::update`]
    pub game_time: Duration,
    /// Best score this session; scores go negative so there is no zero floor
    pub best_score: Option<i32>,
    pub longest_snake: usize,
    pub games_played: u32,
    pub last_outcome: Option<Outcome>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            game_start: Instant::now(),
            game_time: Duration::ZERO,
            best_score: None,
            longest_snake: 0,
            games_played: 0,
            last_outcome: None,
        }
    }

    pub fn update(&mut self) {
        self.game_time = self.game_start.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.game_start = Instant::now();
        self.game_time = Duration::ZERO;
    }

    /// Record a finished game
    pub fn on_game_over(&mut self, score: i32, length: usize, outcome: Outcome) {
        self.games_played += 1;
        self.best_score = Some(self.best_score.map_or(score, |best| best.max(score)));
        self.longest_snake = self.longest_snake.max(length);
        self.last_outcome = Some(outcome);
    }

    /// HUD line, e.g. `Best: 4 | Longest: 7 | Games: 3 (wall) | Time: 01:05`
    pub fn format_summary(&self) -> String {
        let best = self
            .best_score
            .map_or_else(|| "-".to_string(), |score| score.to_string());
        let last = self
            .last_outcome
            .map(|outcome| format!(" ({})", outcome.as_str()))
            .unwrap_or_default();
        format!(
            "Best: {} | Longest: {} | Games: {}{} | Time: {}",
            best,
            self.longest_snake,
            self.games_played,
            last,
            format_clock(self.game_time)
        )
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// `mm:ss`, minutes not wrapped at the hour
fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
