//! State abstraction: compress a board snapshot into a value-table row index
//!
//! Every featurizer is a pure function of the snapshot. Implementations differ in
//! how much of the board they look at and therefore in the size of their index
//! space; [`FeaturizerKind`] picks one at startup.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::game::{Direction, GameConfig, Position, Snapshot};

/// Maps a snapshot to a row of the value table
pub trait StateFeaturizer {
    /// Number of distinct indices; every index returned is below this
    fn state_count(&self) -> usize;

    /// Index of the state the snapshot is in, in `0..state_count()`
    fn state_index(&self, snapshot: &Snapshot) -> usize;

    /// Human readable description of an index
    fn describe(&self, index: usize) -> String {
        format!("state {index}")
    }
}

/// Featurizers selectable from the command line and recorded in model metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FeaturizerKind {
    /// Danger around the head, adjacent red apple, green apples in sight (224 states)
    #[default]
    LineOfSight,
    /// Danger around the head only (8 states)
    Danger,
    /// Cell of the head (board_size² states)
    HeadPosition,
}

impl FeaturizerKind {
    pub fn build(self, config: &GameConfig) -> Box<dyn StateFeaturizer> {
        match self {
            FeaturizerKind::LineOfSight => Box::new(LineOfSightFeaturizer::new(config)),
            FeaturizerKind::Danger => Box::new(DangerFeaturizer::new(config)),
            FeaturizerKind::HeadPosition => Box::new(HeadPositionFeaturizer::new(config)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeaturizerKind::LineOfSight => "line-of-sight",
            FeaturizerKind::Danger => "danger",
            FeaturizerKind::HeadPosition => "head-position",
        }
    }
}

const DANGER_STATES: usize = 8;
const RED_STATES: usize = 4;

const DANGER_LABELS: [&str; DANGER_STATES] = [
    "Safe",
    "Left",
    "Right",
    "Left+Right",
    "Straight",
    "Left+Straight",
    "Right+Straight",
    "All",
];
const RED_LABELS: [&str; RED_STATES] = ["No red", "Red left", "Red right", "Red straight"];
const GREEN_LABELS: [&str; 8] = [
    "No green",
    "Green left",
    "Green right",
    "Green left+right",
    "Green straight",
    "Green left+straight",
    "Green right+straight",
    "Green all",
];

/// The three cells next to the head, as seen from the snake: left, right, straight
fn neighbours(snapshot: &Snapshot) -> [Position; 3] {
    let head = snapshot.head();
    let heading = snapshot.direction;
    [
        head.moved_in_direction(heading.turned_left()),
        head.moved_in_direction(heading.turned_right()),
        head.moved_in_direction(heading),
    ]
}

fn in_bounds(pos: Position, board_size: usize) -> bool {
    pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < board_size && (pos.col as usize) < board_size
}

/// Three bits, left = 1, right = 2, straight = 4, set where the next cell is a
/// wall or part of the snake
fn danger_bits(snapshot: &Snapshot, board_size: usize) -> usize {
    neighbours(snapshot)
        .iter()
        .enumerate()
        .filter(|(_, pos)| !in_bounds(**pos, board_size) || snapshot.is_snake(**pos))
        .fold(0, |bits, (i, _)| bits | 1 << i)
}

fn danger_label(bits: usize) -> &'static str {
    DANGER_LABELS[bits]
}

/// Canonical featurizer
///
/// Combines three features:
/// - danger bits for the cells left, right and straight of the head (8 values)
/// - which of those cells holds a red apple, left before right before straight
///   (4 values, 0 = none)
/// - in which relative directions a green apple sits on the head's row or
///   column with nothing but empty cells in between (3 bits)
///
/// Each green apple sets at most one bit, so with the default two green apples
/// "all three" never happens and the green feature only needs 7 values. With three
/// or more green apples the full 8 values are used.
#[derive(Debug, Clone)]
pub struct LineOfSightFeaturizer {
    board_size: usize,
    green_states: usize,
}

impl LineOfSightFeaturizer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            board_size: config.board_size,
            green_states: if config.green_apples >= 3 { 8 } else { 7 },
        }
    }

    fn red_bearing(&self, snapshot: &Snapshot) -> usize {
        neighbours(snapshot)
            .iter()
            .position(|pos| snapshot.is_red(*pos))
            .map_or(0, |i| i + 1)
    }

    fn green_bits(&self, snapshot: &Snapshot) -> usize {
        let head = snapshot.head();
        let heading = snapshot.direction;

        snapshot
            .green_apples
            .iter()
            .filter_map(|&apple| {
                let direction = line_direction(head, apple)?;
                clear_line(snapshot, head, apple, direction).then_some(direction)
            })
            .fold(0, |bits, direction| {
                if direction == heading.turned_left() {
                    bits | 1
                } else if direction == heading.turned_right() {
                    bits | 2
                } else if direction == heading {
                    bits | 4
                } else {
                    // behind the head, unreachable without turning around
                    bits
                }
            })
    }
}

/// Direction from `from` to `to` if both lie on the same row or column
fn line_direction(from: Position, to: Position) -> Option<Direction> {
    match (to.row - from.row, to.col - from.col) {
        (0, 0) => None,
        (0, d_col) if d_col > 0 => Some(Direction::Right),
        (0, _) => Some(Direction::Left),
        (d_row, 0) if d_row > 0 => Some(Direction::Down),
        (_, 0) => Some(Direction::Up),
        _ => None,
    }
}

/// True if no snake cell or red apple lies strictly between the two cells
fn clear_line(snapshot: &Snapshot, from: Position, to: Position, direction: Direction) -> bool {
    let mut pos = from.moved_in_direction(direction);
    while pos != to {
        if snapshot.is_snake(pos) || snapshot.is_red(pos) {
            return false;
        }
        pos = pos.moved_in_direction(direction);
    }
    true
}

impl StateFeaturizer for LineOfSightFeaturizer {
    fn state_count(&self) -> usize {
        DANGER_STATES * RED_STATES * self.green_states
    }

    fn state_index(&self, snapshot: &Snapshot) -> usize {
        let danger = danger_bits(snapshot, self.board_size);
        let red = self.red_bearing(snapshot);
        let green = self.green_bits(snapshot);

        danger * (RED_STATES * self.green_states) + red * self.green_states + green
    }

    fn describe(&self, index: usize) -> String {
        let danger = index / (RED_STATES * self.green_states);
        let red = (index % (RED_STATES * self.green_states)) / self.green_states;
        let green = index % self.green_states;
        format!(
            "{:<14} | {:<12} | {}",
            danger_label(danger),
            RED_LABELS[red],
            GREEN_LABELS[green]
        )
    }
}

/// Only the three danger bits
#[derive(Debug, Clone)]
pub struct DangerFeaturizer {
    board_size: usize,
}

impl DangerFeaturizer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            board_size: config.board_size,
        }
    }
}

impl StateFeaturizer for DangerFeaturizer {
    fn state_count(&self) -> usize {
        DANGER_STATES
    }

    fn state_index(&self, snapshot: &Snapshot) -> usize {
        danger_bits(snapshot, self.board_size)
    }

    fn describe(&self, index: usize) -> String {
        danger_label(index).to_string()
    }
}

/// One state per head cell
#[derive(Debug, Clone)]
pub struct HeadPositionFeaturizer {
    board_size: usize,
}

impl HeadPositionFeaturizer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            board_size: config.board_size,
        }
    }
}

impl StateFeaturizer for HeadPositionFeaturizer {
    fn state_count(&self) -> usize {
        self.board_size * self.board_size
    }

    fn state_index(&self, snapshot: &Snapshot) -> usize {
        let head = snapshot.head();
        head.row as usize * self.board_size + head.col as usize
    }

    fn describe(&self, index: usize) -> String {
        format!("row: {} | col: {}", index / self.board_size, index % self.board_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Action, SnakeGame};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn snapshot(
        body: &[(i32, i32)],
        direction: Direction,
        green: &[(i32, i32)],
        red: &[(i32, i32)],
    ) -> Snapshot {
        let cells = |list: &[(i32, i32)]| -> Vec<Position> {
            list.iter().map(|&p| Position::from(p)).collect()
        };
        Snapshot {
            body: cells(body),
            direction,
            green_apples: cells(green),
            red_apples: cells(red),
        }
    }

    fn line_of_sight() -> LineOfSightFeaturizer {
        LineOfSightFeaturizer::new(&GameConfig::default())
    }

    #[test]
    fn test_state_space_size() {
        let config = GameConfig::default();
        assert_eq!(FeaturizerKind::LineOfSight.build(&config).state_count(), 224);
        assert_eq!(FeaturizerKind::Danger.build(&config).state_count(), 8);
        assert_eq!(FeaturizerKind::HeadPosition.build(&config).state_count(), 100);

        let many_greens = GameConfig {
            green_apples: 3,
            ..GameConfig::default()
        };
        assert_eq!(LineOfSightFeaturizer::new(&many_greens).state_count(), 256);
    }

    #[test]
    fn test_danger_in_corner() {
        // Top-left corner heading up: wall on the left and straight ahead
        let snap = snapshot(&[(0, 0), (1, 0)], Direction::Up, &[], &[]);
        assert_eq!(danger_bits(&snap, 10), 1 | 4);
    }

    #[test]
    fn test_danger_from_body() {
        // Heading right with the body curling round on the snake's right
        let snap = snapshot(
            &[(4, 4), (4, 3), (5, 3), (5, 4), (5, 5)],
            Direction::Right,
            &[],
            &[],
        );
        assert_eq!(danger_bits(&snap, 10), 2);
    }

    #[test]
    fn test_red_bearing() {
        let f = line_of_sight();
        let left = snapshot(&[(2, 2), (3, 2)], Direction::Up, &[], &[(2, 1)]);
        let right = snapshot(&[(2, 2), (3, 2)], Direction::Up, &[], &[(2, 3)]);
        let straight = snapshot(&[(2, 2), (3, 2)], Direction::Up, &[], &[(1, 2)]);
        let far = snapshot(&[(2, 2), (3, 2)], Direction::Up, &[], &[(0, 2)]);

        assert_eq!(f.red_bearing(&left), 1);
        assert_eq!(f.red_bearing(&right), 2);
        assert_eq!(f.red_bearing(&straight), 3);
        assert_eq!(f.red_bearing(&far), 0);
    }

    #[test]
    fn test_red_bearing_prefers_left_then_right() {
        let f = line_of_sight();
        let snap = snapshot(&[(2, 2), (3, 2)], Direction::Up, &[], &[(1, 2), (2, 3), (2, 1)]);
        assert_eq!(f.red_bearing(&snap), 1);

        let snap = snapshot(&[(2, 2), (3, 2)], Direction::Up, &[], &[(1, 2), (2, 3)]);
        assert_eq!(f.red_bearing(&snap), 2);
    }

    #[test]
    fn test_green_line_of_sight() {
        let f = line_of_sight();

        let ahead = snapshot(&[(5, 5), (6, 5)], Direction::Up, &[(0, 5)], &[]);
        assert_eq!(f.green_bits(&ahead), 4);

        let left_and_right = snapshot(&[(5, 5), (6, 5)], Direction::Up, &[(5, 0), (5, 9)], &[]);
        assert_eq!(f.green_bits(&left_and_right), 1 | 2);

        // Heading right, an apple above the head is on the snake's left
        let rotated = snapshot(&[(5, 5), (5, 4)], Direction::Right, &[(2, 5)], &[]);
        assert_eq!(f.green_bits(&rotated), 1);

        let behind = snapshot(&[(5, 5), (4, 5)], Direction::Down, &[(0, 5)], &[]);
        assert_eq!(f.green_bits(&behind), 0);

        let diagonal = snapshot(&[(5, 5), (6, 5)], Direction::Up, &[(3, 3)], &[]);
        assert_eq!(f.green_bits(&diagonal), 0);
    }

    #[test]
    fn test_green_blocked_by_red_or_body() {
        let f = line_of_sight();

        let red_between = snapshot(&[(5, 5), (6, 5)], Direction::Up, &[(0, 5)], &[(2, 5)]);
        assert_eq!(f.green_bits(&red_between), 0);

        let body_between = snapshot(
            &[(5, 5), (5, 6), (4, 6), (3, 6), (3, 5), (3, 4)],
            Direction::Left,
            &[(0, 5)],
            &[],
        );
        // Heading left, the apple above is to the right and hidden by (3,5)
        assert_eq!(f.green_bits(&body_between), 0);
    }

    #[test]
    fn test_combined_index() {
        let f = line_of_sight();
        // Danger straight (wall), red on the left, green on the right
        let snap = snapshot(&[(0, 5), (1, 5)], Direction::Up, &[(0, 9)], &[(0, 4)]);
        assert_eq!(f.state_index(&snap), 4 * 28 + 7 + 2);
        assert_eq!(f.describe(4 * 28 + 7 + 2), format!("{:<14} | {:<12} | {}", "Straight", "Red left", "Green right"));
    }

    #[test]
    fn test_combination_is_injective() {
        let g = 7;
        let mut seen = HashSet::new();
        for danger in 0..8 {
            for red in 0..4 {
                for green in 0..g {
                    let index = danger * (4 * g) + red * g + green;
                    assert!(index < 224);
                    assert!(seen.insert(index));
                }
            }
        }
        assert_eq!(seen.len(), 224);
    }

    #[test]
    fn test_index_totality_over_random_games() {
        let config = GameConfig::default();
        let featurizers: Vec<Box<dyn StateFeaturizer>> = vec![
            FeaturizerKind::LineOfSight.build(&config),
            FeaturizerKind::Danger.build(&config),
            FeaturizerKind::HeadPosition.build(&config),
        ];
        let mut chooser = StdRng::seed_from_u64(11);

        for seed in 0..30 {
            let mut game = SnakeGame::new(config.clone(), StdRng::seed_from_u64(seed)).unwrap();
            loop {
                let snap = game.snapshot();
                for f in &featurizers {
                    assert!(f.state_index(&snap) < f.state_count());
                }
                game.apply(Action::ALL[chooser.gen_range(0..Action::COUNT)]);
                if !game.step().success {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_head_position_index() {
        let f = HeadPositionFeaturizer::new(&GameConfig::default());
        let snap = snapshot(&[(3, 7)], Direction::Up, &[], &[]);
        assert_eq!(f.state_index(&snap), 37);
        assert_eq!(f.describe(37), "row: 3 | col: 7");
    }

    #[test]
    fn test_kind_names_match_cli_values() {
        for kind in [
            FeaturizerKind::LineOfSight,
            FeaturizerKind::Danger,
            FeaturizerKind::HeadPosition,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
