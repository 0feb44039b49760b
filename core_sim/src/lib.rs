//! Core simulation crate for the Veilwalk headless prototype.
//!
//! Provides deterministic ECS systems that resolve a single turn of the
//! simulation when [`run_turn`] is invoked: world-board rebuild, perception
//! resolution, explorer movement, then bookkeeping (tick, metrics,
//! snapshot, turn cap).

mod board;
mod components;
mod explorer;
pub mod metrics;
mod perception;
mod resources;
mod scenario;
mod snapshot;
mod turn;

use std::sync::Arc;

use bevy::prelude::*;

pub use board::WorldBoard;
pub use components::{ActorClass, GridPosition, PerceptionField};
pub use explorer::{ExplorerMind, MoveDecision};
pub use metrics::SimulationMetrics;
pub use perception::{CellSignal, ItemCollected};
pub use resources::{ActorRoster, RunOutcome, RunState, SimulationConfig, SimulationTick};
pub use scenario::{
    ExplorerSpec, PickupSpec, ScenarioConfig, ScenarioError, ScenarioHandle, SentrySpec,
    BUILTIN_SCENARIO,
};
pub use snapshot::SnapshotHistory;
pub use turn::RunReport;

/// Construct a Bevy [`App`] running the builtin reference scenario.
pub fn build_headless_app() -> App {
    build_scenario_app(ScenarioConfig::builtin()).expect("builtin scenario should validate")
}

/// Construct a Bevy [`App`] configured with the Veilwalk turn pipeline
/// around a validated scenario.
pub fn build_scenario_app(scenario: ScenarioConfig) -> Result<App, ScenarioError> {
    scenario.validate()?;

    let config = SimulationConfig {
        bounds: scenario.bounds,
        turn_cap: scenario.turn_cap,
    };

    let mut app = App::new();
    app.insert_resource(config)
        .insert_resource(SimulationTick::default())
        .insert_resource(WorldBoard::default())
        .insert_resource(ActorRoster::default())
        .insert_resource(RunOutcome::default())
        .insert_resource(SimulationMetrics::default())
        .insert_resource(SnapshotHistory::default())
        .insert_resource(ScenarioHandle(Arc::new(scenario)))
        .add_event::<ItemCollected>()
        .add_plugins(MinimalPlugins)
        .add_systems(Startup, scenario::spawn_scenario)
        .add_systems(
            Update,
            (
                board::rebuild_world_board.run_if(turn::simulation_running),
                perception::resolve_perception.run_if(turn::simulation_running),
                explorer::resolve_movement.run_if(turn::simulation_running),
                turn::advance_tick.run_if(turn::simulation_running),
                perception::log_collections,
                metrics::collect_metrics,
                snapshot::capture_snapshot,
                turn::enforce_turn_cap,
            )
                .chain(),
        );

    Ok(app)
}

/// Execute a single simulation turn.
///
/// Each call processes the chained systems configured in
/// [`build_scenario_app`] (board rebuild → perception → movement → tick →
/// metrics → snapshot → cap). Callers are responsible for rendering and for
/// stopping once the outcome leaves `Running`.
pub fn run_turn(app: &mut App) {
    app.update();
}

/// Drive turns until the run leaves `Running`, then summarize it.
pub fn run_to_completion(app: &mut App) -> RunReport {
    while app.world.resource::<RunOutcome>().is_running() {
        run_turn(app);
    }
    turn::report(app)
}
