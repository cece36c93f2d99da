use serde::{Deserialize, Serialize};

use crate::error::SnakeError;

/// Absolute heading of the snake on the board.
///
/// Rows grow downwards, so `Up` decreases the row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions, in clockwise order starting from `Up`
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Numeric encoding used on the wire (0 = up, clockwise)
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Returns the unit offset `(d_row, d_col)` for moving in this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Heading after a quarter turn to the snake's left
    pub fn turned_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Right => Direction::Up,
            Direction::Down => Direction::Right,
            Direction::Left => Direction::Down,
        }
    }

    /// Heading after a quarter turn to the snake's right
    pub fn turned_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn turned(self, turn: Turn) -> Self {
        match turn {
            Turn::Left => self.turned_left(),
            Turn::Right => self.turned_right(),
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = SnakeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Right),
            2 => Ok(Direction::Down),
            3 => Ok(Direction::Left),
            other => Err(SnakeError::InvalidDirection(other)),
        }
    }
}

/// Turn relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Discrete action available to the agent.
///
/// The agent steers relative to its heading, so there are three actions rather
/// than four absolute directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TurnLeft,
    TurnRight,
    Straight,
}

impl Action {
    pub const COUNT: usize = 3;

    /// All actions, ordered by index. Greedy ties resolve to the earliest entry.
    pub const ALL: [Action; Action::COUNT] = [Action::TurnLeft, Action::TurnRight, Action::Straight];

    pub fn index(self) -> usize {
        match self {
            Action::TurnLeft => 0,
            Action::TurnRight => 1,
            Action::Straight => 2,
        }
    }

    /// Action for a value-table column
    ///
    /// # Panics
    ///
    /// Panics if `index >= Action::COUNT`.
    pub fn from_index(index: usize) -> Self {
        match Self::try_from(index as i64) {
            Ok(action) => action,
            Err(err) => panic!("{err}"),
        }
    }

    /// The relative turn this action performs, if any
    pub fn turn(self) -> Option<Turn> {
        match self {
            Action::TurnLeft => Some(Turn::Left),
            Action::TurnRight => Some(Turn::Right),
            Action::Straight => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::TurnLeft => "Left",
            Action::TurnRight => "Right",
            Action::Straight => "Straight",
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = SnakeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::TurnLeft),
            1 => Ok(Action::TurnRight),
            2 => Ok(Action::Straight),
            other => Err(SnakeError::InvalidAction(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_directions() {
        assert!(Direction::Up.is_opposite(Direction::Down));
        assert!(Direction::Down.is_opposite(Direction::Up));
        assert!(Direction::Left.is_opposite(Direction::Right));
        assert!(Direction::Right.is_opposite(Direction::Left));

        assert!(!Direction::Up.is_opposite(Direction::Left));
        assert!(!Direction::Up.is_opposite(Direction::Right));
        assert!(!Direction::Up.is_opposite(Direction::Up));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (0, 1));
        assert_eq!(Direction::Down.delta(), (1, 0));
        assert_eq!(Direction::Left.delta(), (0, -1));
    }

    #[test]
    fn test_rotation_table() {
        assert_eq!(Direction::Up.turned_left(), Direction::Left);
        assert_eq!(Direction::Up.turned_right(), Direction::Right);
        assert_eq!(Direction::Right.turned_left(), Direction::Up);
        assert_eq!(Direction::Right.turned_right(), Direction::Down);
        assert_eq!(Direction::Down.turned_left(), Direction::Right);
        assert_eq!(Direction::Down.turned_right(), Direction::Left);
        assert_eq!(Direction::Left.turned_left(), Direction::Down);
        assert_eq!(Direction::Left.turned_right(), Direction::Up);
    }

    #[test]
    fn test_turn_left_then_right_is_identity() {
        for dir in Direction::ALL {
            assert_eq!(dir.turned(Turn::Left).turned(Turn::Right), dir);
            assert_eq!(dir.turned(Turn::Right).turned(Turn::Left), dir);
        }
    }

    #[test]
    fn test_direction_from_index() {
        for dir in Direction::ALL {
            assert_eq!(Direction::try_from(dir.index() as i64), Ok(dir));
        }
        assert_eq!(Direction::try_from(99), Err(SnakeError::InvalidDirection(99)));
        assert_eq!(Direction::try_from(-1), Err(SnakeError::InvalidDirection(-1)));
    }

    #[test]
    fn test_action_from_index() {
        assert_eq!(Action::try_from(0), Ok(Action::TurnLeft));
        assert_eq!(Action::try_from(2), Ok(Action::Straight));
        assert_eq!(Action::try_from(3), Err(SnakeError::InvalidAction(3)));
        assert_eq!(Action::from_index(1), Action::TurnRight);
    }

    #[test]
    #[should_panic(expected = "invalid action")]
    fn test_action_from_bad_column_panics() {
        Action::from_index(7);
    }
}
