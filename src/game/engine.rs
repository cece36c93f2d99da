use rand::Rng;
use rand::rngs::StdRng;
use std::collections::VecDeque;

use super::{
    action::{Action, Direction, Turn},
    config::GameConfig,
    grid::{Board, Cell, Position},
    state::{Outcome, Snapshot, StepResult},
};
use crate::error::{Result, SnakeError};

/// Apple colour, used when replenishing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Apple {
    Green,
    Red,
}

impl Apple {
    fn cell(self) -> Cell {
        match self {
            Apple::Green => Cell::Green,
            Apple::Red => Cell::Red,
        }
    }
}

/// One game of snake.
///
/// Owns the snake, both apple sets and the board occupancy, and applies one move
/// per [`SnakeGame::step`]. Every tick, including the one that ends the game, is
/// recorded in the history so the game can be replayed. The random source only
/// drives the initial layout and apple placement.
pub struct SnakeGame<R = StdRng> {
    config: GameConfig,
    board: Board,
    /// Snake cells, head at the front
    body: VecDeque<Position>,
    direction: Direction,
    green_apples: Vec<Position>,
    red_apples: Vec<Position>,
    history: Vec<Snapshot>,
    /// Set once a move has failed
    terminal: Option<StepResult>,
    rng: R,
}

impl<R: Rng> SnakeGame<R> {
    /// Start a new game with a randomly placed snake and apples
    ///
    /// The snake is laid out in a straight line behind a random head with a
    /// random heading. Layouts are redrawn until the whole body and the cell in
    /// front of the head are on the board, so the first move can never hit a
    /// wall by construction.
    pub fn new(config: GameConfig, mut rng: R) -> Result<Self> {
        config.validate().map_err(SnakeError::InvalidConfig)?;

        let size = config.board_size as i32;
        let mut board = Board::new(config.board_size);
        let (body, direction) = loop {
            let head = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            let (d_row, d_col) = direction.delta();
            let body: VecDeque<Position> = (0..config.initial_length as i32)
                .map(|i| head.moved_by(-d_row * i, -d_col * i))
                .collect();
            let ahead = head.moved_in_direction(direction);

            if body.iter().all(|&pos| board.is_in_bounds(pos)) && board.is_in_bounds(ahead) {
                break (body, direction);
            }
        };

        for &pos in &body {
            board.set(pos, Cell::Snake);
        }

        let mut game = Self {
            config,
            board,
            body,
            direction,
            green_apples: Vec::new(),
            red_apples: Vec::new(),
            history: Vec::new(),
            terminal: None,
            rng,
        };

        for _ in 0..game.config.green_apples {
            game.place_apple(Apple::Green);
        }
        for _ in 0..game.config.red_apples {
            game.place_apple(Apple::Red);
        }

        game.history.push(game.snapshot());
        Ok(game)
    }

    /// Rebuild a game from a recorded snapshot
    ///
    /// The snapshot becomes the first history entry and the free cells are
    /// recomputed from it. Snapshots that break the board invariants are
    /// rejected.
    pub fn from_snapshot(config: GameConfig, snapshot: &Snapshot, rng: R) -> Result<Self> {
        config.validate().map_err(SnakeError::InvalidConfig)?;

        let board = snapshot.to_board(&config)?;

        Ok(Self {
            config,
            board,
            body: snapshot.body.iter().copied().collect(),
            direction: snapshot.direction,
            green_apples: snapshot.green_apples.clone(),
            red_apples: snapshot.red_apples.clone(),
            history: vec![snapshot.clone()],
            terminal: None,
            rng,
        })
    }

    /// Change heading; reversing onto the neck is silently ignored
    pub fn set_direction(&mut self, direction: Direction) {
        if !self.direction.is_opposite(direction) {
            self.direction = direction;
        }
    }

    /// Change heading from a raw wire value (0 = up, clockwise)
    pub fn set_direction_index(&mut self, command: i64) -> Result<()> {
        let direction = Direction::try_from(command)?;
        self.set_direction(direction);
        Ok(())
    }

    pub fn turn(&mut self, turn: Turn) {
        self.set_direction(self.direction.turned(turn));
    }

    /// Steer according to an agent action (does not move)
    pub fn apply(&mut self, action: Action) {
        if let Some(turn) = action.turn() {
            self.turn(turn);
        }
    }

    /// Advance the game by one tick
    ///
    /// Returns `success == false` when the move ends the game: hitting a wall
    /// or the body, eating a red apple at length 1, or eating an apple when no
    /// free cell is left for its replacement. Once the game is over further
    /// calls return the terminal result without touching the state.
    pub fn step(&mut self) -> StepResult {
        if let Some(result) = self.terminal {
            return result;
        }

        let result = self.resolve_move();
        if !result.success {
            self.terminal = Some(result);
        }

        self.history.push(self.snapshot());
        result
    }

    fn resolve_move(&mut self) -> StepResult {
        let new_head = self.head().moved_in_direction(self.direction);
        let outcome = self.classify(new_head);

        match outcome {
            Outcome::Wall | Outcome::SelfCollision => return StepResult::dead(outcome),
            Outcome::Red if self.body.len() == 1 => return StepResult::dead(outcome),
            _ => {}
        }

        // Vacate the tail first: the head may be moving into it.
        if outcome != Outcome::Green {
            self.pop_tail();
        }
        if outcome == Outcome::Red {
            self.pop_tail();
        }

        self.body.push_front(new_head);
        self.board.set(new_head, Cell::Snake);

        let eaten = match outcome {
            Outcome::Green => Some(Apple::Green),
            Outcome::Red => Some(Apple::Red),
            _ => None,
        };

        if let Some(apple) = eaten {
            self.apples_mut(apple).retain(|&pos| pos != new_head);
            if !self.place_apple(apple) {
                tracing::warn!(?apple, "board is full, cannot replace apple");
                return StepResult::dead(outcome);
            }
        }

        StepResult::alive(outcome)
    }

    /// Classify the cell the head is about to enter
    fn classify(&self, pos: Position) -> Outcome {
        match self.board.get(pos) {
            None => Outcome::Wall,
            // The tail moves away this same tick
            Some(Cell::Snake) if pos == self.tail() => Outcome::Empty,
            Some(Cell::Snake) => Outcome::SelfCollision,
            Some(Cell::Green) => Outcome::Green,
            Some(Cell::Red) => Outcome::Red,
            Some(Cell::Empty) => Outcome::Empty,
        }
    }

    fn pop_tail(&mut self) {
        if let Some(tail) = self.body.pop_back() {
            self.board.set(tail, Cell::Empty);
        }
    }

    /// Put one apple on a random free cell; false if the board is full
    fn place_apple(&mut self, apple: Apple) -> bool {
        let Some(pos) = self.board.random_free(&mut self.rng) else {
            return false;
        };
        self.board.set(pos, apple.cell());
        self.apples_mut(apple).push(pos);
        true
    }

    fn apples_mut(&mut self, apple: Apple) -> &mut Vec<Position> {
        match apple {
            Apple::Green => &mut self.green_apples,
            Apple::Red => &mut self.red_apples,
        }
    }
}

impl<R> SnakeGame<R> {
    /// Copy of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            body: self.body.iter().copied().collect(),
            direction: self.direction,
            green_apples: self.green_apples.clone(),
            red_apples: self.red_apples.clone(),
        }
    }

    /// Every recorded tick, oldest first
    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Snapshot> {
        self.history
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false: the snake never shrinks below one cell
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn green_apples(&self) -> &[Position] {
        &self.green_apples
    }

    pub fn red_apples(&self) -> &[Position] {
        &self.red_apples
    }

    pub fn is_over(&self) -> bool {
        self.terminal.is_some()
    }

    /// The failed move that ended the game, if it has ended
    pub fn terminal_result(&self) -> Option<StepResult> {
        self.terminal
    }

    /// Length gained (or lost) since the start of the game
    pub fn score(&self) -> i32 {
        self.body.len() as i32 - self.config.initial_length as i32
    }
}
