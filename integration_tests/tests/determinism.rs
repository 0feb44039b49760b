use core_sim::{
    build_headless_app, build_scenario_app, run_to_completion, RunReport, ScenarioConfig,
    SnapshotHistory,
};

fn finished_hashes(app: &mut bevy::app::App) -> (u64, u64) {
    let history = app.world.resource::<SnapshotHistory>();
    let board = history.last_board.as_ref().expect("board snapshot");
    let knowledge = history.last_knowledge.as_ref().expect("knowledge snapshot");
    (board.header.hash, knowledge.header.hash)
}

#[test]
fn reference_runs_are_bit_identical() {
    let mut first = build_headless_app();
    let mut second = build_headless_app();

    let report_a: RunReport = run_to_completion(&mut first);
    let report_b: RunReport = run_to_completion(&mut second);
    assert_eq!(report_a, report_b);

    assert_eq!(finished_hashes(&mut first), finished_hashes(&mut second));
}

#[test]
fn seeded_random_runs_are_reproducible() {
    let mut first =
        build_scenario_app(ScenarioConfig::random(7)).expect("random scenario validates");
    let mut second =
        build_scenario_app(ScenarioConfig::random(7)).expect("random scenario validates");

    assert_eq!(run_to_completion(&mut first), run_to_completion(&mut second));
    assert_eq!(finished_hashes(&mut first), finished_hashes(&mut second));
}
