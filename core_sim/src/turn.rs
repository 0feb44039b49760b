//! Turn orchestration: phase gating, tick advance, cap enforcement and run
//! reports.

use bevy::prelude::*;
use sim_runtime::{GridPos, ItemKind};

use crate::{
    explorer::ExplorerMind,
    resources::{RunOutcome, RunState, SimulationConfig, SimulationTick},
};

/// Run condition gating the simulation phases. Conditions are evaluated
/// immediately before each system, so a terminal signal raised mid-turn
/// skips every remaining gated phase of that turn.
pub fn simulation_running(outcome: Res<RunOutcome>) -> bool {
    outcome.is_running()
}

/// Count the completed turn.
pub fn advance_tick(mut tick: ResMut<SimulationTick>) {
    tick.0 += 1;
}

/// Stop a still-running simulation once the configured cap elapses.
pub fn enforce_turn_cap(
    config: Res<SimulationConfig>,
    tick: Res<SimulationTick>,
    mut outcome: ResMut<RunOutcome>,
) {
    if outcome.is_running() && tick.0 >= config.turn_cap {
        tracing::info!(target: "veilwalk::turn", turn = tick.0, "turn cap reached");
        outcome.finish(RunState::TurnLimitReached, tick.0);
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub state: RunState,
    pub turns: u64,
    pub path: Vec<GridPos>,
    pub collected: Vec<ItemKind>,
    pub sightings: Vec<GridPos>,
}

pub(crate) fn report(app: &mut App) -> RunReport {
    let outcome = app.world.resource::<RunOutcome>().clone();
    let turns = outcome
        .ended_on_turn
        .unwrap_or(app.world.resource::<SimulationTick>().0);

    let mut query = app.world.query::<&ExplorerMind>();
    let mind = query.single(&app.world);

    RunReport {
        state: outcome.state,
        turns,
        path: mind.path().to_vec(),
        collected: mind.collected().to_vec(),
        sightings: mind.sightings().to_vec(),
    }
}
