use core_sim::{
    build_scenario_app, run_turn, ExplorerMind, ExplorerSpec, PickupSpec, RunOutcome,
    ScenarioConfig, SentrySpec, WorldBoard,
};
use sim_runtime::{CellFlags, Footprint, FootprintSpec, GridBounds, GridPos, ItemKind};

fn mind(app: &mut bevy::app::App) -> ExplorerMind {
    let mut query = app.world.query::<&ExplorerMind>();
    query.single(&app.world).clone()
}

/// A sentry inside the explorer's footprint leaves HAZARD at every in-bounds
/// cell of its field in the perceived map, while its own cell reads SENTRY.
#[test]
fn sensed_sentry_field_lands_in_the_perceived_map() {
    let sentry_pos = GridPos::new(2, 7);
    let scenario = ScenarioConfig {
        bounds: GridBounds::new(9, 9),
        turn_cap: 10,
        explorer: ExplorerSpec {
            start: GridPos::new(2, 5),
            footprint: FootprintSpec::Square { radius: 3 },
        },
        sentries: vec![SentrySpec {
            position: sentry_pos,
            radius: 1,
        }],
        pickups: vec![PickupSpec {
            position: GridPos::new(1, 4),
            kind: ItemKind::Exit,
        }],
    };
    let mut app = build_scenario_app(scenario).expect("scenario builds");
    run_turn(&mut app);

    assert!(
        app.world.resource::<RunOutcome>().is_running(),
        "the sentry never sees a cell outside its own field"
    );

    let mind = mind(&mut app);
    for offset in Footprint::neighborhood().offsets() {
        let cell = sentry_pos + *offset;
        assert!(
            mind.perceived(cell).contains(CellFlags::HAZARD),
            "hazard missing at {cell}"
        );
    }
    assert_eq!(mind.perceived(sentry_pos), CellFlags::SENTRY);
    assert!(!mind.perceived(sentry_pos).contains(CellFlags::HAZARD));
    assert_eq!(mind.sightings(), &[sentry_pos]);

    // the exit inside the footprint is sensed too; it is not portable
    assert_eq!(mind.perceived(GridPos::new(1, 4)), CellFlags::EXIT);
}

/// Portable items are stripped from deliveries: a sensed book or cloak cell
/// leaves no trace in the perceived map even though it sits on the board.
#[test]
fn portable_items_never_reach_the_perceived_map() {
    let scenario = ScenarioConfig {
        bounds: GridBounds::new(3, 3),
        turn_cap: 5,
        explorer: ExplorerSpec {
            start: GridPos::ZERO,
            footprint: FootprintSpec::Square { radius: 1 },
        },
        sentries: Vec::new(),
        pickups: vec![
            PickupSpec {
                position: GridPos::new(1, 0),
                kind: ItemKind::Book,
            },
            PickupSpec {
                position: GridPos::new(0, 1),
                kind: ItemKind::Cloak,
            },
        ],
    };
    let mut app = build_scenario_app(scenario).expect("scenario builds");
    run_turn(&mut app);

    let board = app.world.resource::<WorldBoard>();
    assert_eq!(board.get(GridPos::new(1, 0)), Some(CellFlags::BOOK));
    assert_eq!(board.get(GridPos::new(0, 1)), Some(CellFlags::CLOAK));

    let mind = mind(&mut app);
    assert_eq!(mind.perceived(GridPos::new(1, 0)), CellFlags::empty());
    assert_eq!(mind.perceived(GridPos::new(0, 1)), CellFlags::empty());
}

/// Standing on an item consumes it through the pickup's own trigger while
/// generic perception still records nothing at that cell.
#[test]
fn consumption_and_perception_use_different_views_of_one_cell() {
    let scenario = ScenarioConfig {
        bounds: GridBounds::new(3, 3),
        turn_cap: 5,
        explorer: ExplorerSpec {
            start: GridPos::ZERO,
            footprint: FootprintSpec::Square { radius: 1 },
        },
        sentries: Vec::new(),
        pickups: vec![PickupSpec {
            position: GridPos::ZERO,
            kind: ItemKind::Book,
        }],
    };
    let mut app = build_scenario_app(scenario).expect("scenario builds");
    run_turn(&mut app);

    let mind = mind(&mut app);
    assert_eq!(mind.collected(), &[ItemKind::Book]);
    assert_eq!(mind.perceived(GridPos::ZERO), CellFlags::empty());
    assert!(
        app.world.resource::<RunOutcome>().is_running(),
        "book consumption is non-fatal"
    );
}
