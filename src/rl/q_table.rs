//! Value table and the one-step Q-learning update

use serde::{Deserialize, Serialize};

use crate::game::Action;

/// How much of the table has been touched by learning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    /// States with at least one non-zero action value
    pub visited_states: usize,
    pub total_states: usize,
    /// Non-zero action values
    pub taken_actions: usize,
    pub total_actions: usize,
}

impl Coverage {
    pub fn state_fraction(&self) -> f32 {
        ratio(self.visited_states, self.total_states)
    }

    pub fn action_fraction(&self) -> f32 {
        ratio(self.taken_actions, self.total_actions)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "States visited: {}/{} ({:.2} %) | Actions taken: {}/{} ({:.2} %)",
            self.visited_states,
            self.total_states,
            self.state_fraction() * 100.0,
            self.taken_actions,
            self.total_actions,
            self.action_fraction() * 100.0,
        )
    }
}

fn ratio(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32
    }
}

/// One score per (state, action) pair, stored row-major with one row per state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    states: usize,
    actions: usize,
    values: Vec<f32>,
}

impl QTable {
    /// Zero-initialised table for `states` rows and the three steering actions
    pub fn new(states: usize) -> Self {
        Self {
            states,
            actions: Action::COUNT,
            values: vec![0.0; states * Action::COUNT],
        }
    }

    pub fn state_count(&self) -> usize {
        self.states
    }

    pub fn action_count(&self) -> usize {
        self.actions
    }

    /// True if the dimensions agree with the stored values
    pub fn is_well_formed(&self) -> bool {
        self.actions == Action::COUNT && self.values.len() == self.states * self.actions
    }

    /// Action values for one state
    ///
    /// # Panics
    ///
    /// Panics if `state` is outside the table.
    pub fn row(&self, state: usize) -> &[f32] {
        self.check_state(state);
        &self.values[state * self.actions..(state + 1) * self.actions]
    }

    pub fn value(&self, state: usize, action: Action) -> f32 {
        self.row(state)[action.index()]
    }

    pub fn set_value(&mut self, state: usize, action: Action, value: f32) {
        self.check_state(state);
        self.values[state * self.actions + action.index()] = value;
    }

    /// Highest-scoring action; ties go to the lowest action index
    pub fn greedy_action(&self, state: usize) -> Action {
        let row = self.row(state);
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        Action::from_index(best)
    }

    pub fn max_value(&self, state: usize) -> f32 {
        self.row(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Apply one temporal-difference update and return the new score
    ///
    /// `next_state` is `None` for a terminal transition, in which case the
    /// target is the reward alone:
    ///
    /// ```text
    /// Q(s,a) += alpha * (reward + gamma * max_a' Q(s',a') - Q(s,a))
    /// Q(s,a) += alpha * (reward - Q(s,a))                  (terminal)
    /// ```
    pub fn update(
        &mut self,
        state: usize,
        action: Action,
        reward: f32,
        next_state: Option<usize>,
        alpha: f32,
        gamma: f32,
    ) -> f32 {
        let old = self.value(state, action);
        let target = match next_state {
            Some(next) => reward + gamma * self.max_value(next),
            None => reward,
        };
        let new = old + alpha * (target - old);
        self.set_value(state, action, new);
        new
    }

    pub fn coverage(&self) -> Coverage {
        let visited_states = self
            .values
            .chunks(self.actions)
            .filter(|row| row.iter().any(|&v| v != 0.0))
            .count();
        let taken_actions = self.values.iter().filter(|&&v| v != 0.0).count();

        Coverage {
            visited_states,
            total_states: self.states,
            taken_actions,
            total_actions: self.values.len(),
        }
    }

    fn check_state(&self, state: usize) {
        assert!(
            state < self.states,
            "state index {state} out of range for a table of {} states",
            self.states
        );
    }
}
