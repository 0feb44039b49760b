//! Headless scenario runner.
//!
//! Drives the turn pipeline to completion, drawing the shared world board
//! and the explorer's knowledge view after every turn. Configured through
//! the environment: `SCENARIO_PATH` (JSON file), `SCENARIO_SEED` (random
//! layout) or neither (builtin reference layout), plus `SNAPSHOT_DUMP` to
//! write the final encoded snapshots to a file.

use std::path::PathBuf;

use tracing::{error, info};

use core_sim::{
    build_scenario_app, run_turn, RunOutcome, ScenarioConfig, SimulationMetrics, SnapshotHistory,
};
use sim_runtime::{merge_records, render_lines, GridBounds};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let scenario = match ScenarioConfig::from_env() {
        Ok(scenario) => scenario,
        Err(err) => {
            error!("scenario load failed: {err}");
            std::process::exit(1);
        }
    };
    let bounds = scenario.bounds;

    let mut app = match build_scenario_app(scenario) {
        Ok(app) => app,
        Err(err) => {
            error!("scenario rejected: {err}");
            std::process::exit(1);
        }
    };

    info!(target: "veilwalk::runner", %bounds, "headless run starting");

    loop {
        run_turn(&mut app);
        draw_views(&app, bounds);

        let outcome = app.world.resource::<RunOutcome>().clone();
        if !outcome.is_running() {
            let metrics = app.world.resource::<SimulationMetrics>().clone();
            info!(
                target: "veilwalk::runner",
                state = %outcome.state,
                turn = metrics.turn,
                items = metrics.items_collected,
                sightings = metrics.sentry_sightings,
                path = metrics.path_length,
                "run finished"
            );
            break;
        }
    }

    if let Ok(path) = std::env::var("SNAPSHOT_DUMP") {
        dump_snapshots(&app, PathBuf::from(path));
    }
}

fn draw_views(app: &bevy::app::App, bounds: GridBounds) {
    let history = app.world.resource::<SnapshotHistory>();

    if let Some(board) = &history.last_board {
        println!("world board, turn {}", board.header.tick);
        for line in render_lines(&board.cells, bounds) {
            println!("{line}");
        }
    }

    if let Some(knowledge) = &history.last_knowledge {
        let merged = merge_records(&[&knowledge.perceived, &knowledge.visited]);
        println!("explorer knowledge, turn {}", knowledge.header.tick);
        for line in render_lines(&merged, bounds) {
            println!("{line}");
        }
    }

    println!();
}

fn dump_snapshots(app: &bevy::app::App, path: PathBuf) {
    let history = app.world.resource::<SnapshotHistory>();
    let mut payload = Vec::new();
    if let Some(board) = &history.encoded_board {
        payload.extend_from_slice(board);
        payload.push(b'\n');
    }
    if let Some(knowledge) = &history.encoded_knowledge {
        payload.extend_from_slice(knowledge);
        payload.push(b'\n');
    }
    match std::fs::write(&path, payload) {
        Ok(()) => info!(target: "veilwalk::runner", path = %path.display(), "snapshots dumped"),
        Err(err) => error!("snapshot dump to {} failed: {err}", path.display()),
    }
}
