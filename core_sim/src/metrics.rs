use bevy::prelude::*;

use crate::{
    board::WorldBoard,
    explorer::ExplorerMind,
    resources::{RunOutcome, SimulationTick},
};

/// Aggregate counters refreshed at the end of every turn.
#[derive(Resource, Default, Debug, Clone)]
pub struct SimulationMetrics {
    pub turn: u64,
    pub board_cells: usize,
    pub perceived_cells: usize,
    pub frontier_cells: usize,
    pub exhausted_cells: usize,
    pub stack_depth: usize,
    pub path_length: usize,
    pub items_collected: usize,
    pub sentry_sightings: usize,
}

pub fn collect_metrics(
    tick: Res<SimulationTick>,
    outcome: Res<RunOutcome>,
    board: Res<WorldBoard>,
    minds: Query<&ExplorerMind>,
    mut metrics: ResMut<SimulationMetrics>,
) {
    metrics.turn = outcome.ended_on_turn.unwrap_or(tick.0);
    metrics.board_cells = board.len();

    if let Ok(mind) = minds.get_single() {
        metrics.perceived_cells = mind.perceived_cells().count();
        metrics.frontier_cells = mind.frontier_count();
        metrics.exhausted_cells = mind.exhausted_count();
        metrics.stack_depth = mind.stack_depth();
        metrics.path_length = mind.path().len();
        metrics.items_collected = mind.collected().len();
        metrics.sentry_sightings = mind.sightings().len();
    }
}
