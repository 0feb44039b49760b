use std::fmt;

use bevy::prelude::*;
use sim_runtime::GridBounds;

/// Global configuration parameters for the headless simulation.
#[derive(Resource, Debug, Clone)]
pub struct SimulationConfig {
    pub bounds: GridBounds,
    pub turn_cap: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bounds: GridBounds::new(9, 9),
            turn_cap: 10,
        }
    }
}

/// Tracks total simulation turns completed.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTick(pub u64);

/// Actor entities in registration order.
///
/// Every per-turn phase iterates this roster instead of a raw query, so
/// actor processing order is the spawn order rather than archetype order.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActorRoster {
    pub actors: Vec<Entity>,
    pub explorer: Option<Entity>,
}

/// Terminal condition of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    /// The explorer consumed the exit.
    Escaped,
    /// A sentry perceived the explorer.
    Caught,
    /// The exploration space was exhausted with an empty backtrack stack.
    Exhausted,
    /// The configured cap elapsed with the run still live.
    TurnLimitReached,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Running => "running",
            RunState::Escaped => "escaped",
            RunState::Caught => "caught",
            RunState::Exhausted => "exhausted",
            RunState::TurnLimitReached => "turn_limit_reached",
        };
        write!(f, "{name}")
    }
}

/// Outcome written by the turn pipeline; the first terminal state wins and
/// later signals are ignored.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub state: RunState,
    pub ended_on_turn: Option<u64>,
}

impl RunOutcome {
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn finish(&mut self, state: RunState, turn: u64) {
        if self.is_running() {
            self.state = state;
            self.ended_on_turn = Some(turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_terminal_state_wins() {
        let mut outcome = RunOutcome::default();
        assert!(outcome.is_running());

        outcome.finish(RunState::Caught, 3);
        outcome.finish(RunState::TurnLimitReached, 10);

        assert_eq!(outcome.state, RunState::Caught);
        assert_eq!(outcome.ended_on_turn, Some(3));
    }
}
