//! Scenario configuration and actor spawning.
//!
//! Scenarios come from three sources: the builtin reference layout compiled
//! in with `include_str!`, a JSON file named by `SCENARIO_PATH`, or a
//! seeded random layout via `SCENARIO_SEED`. All three pass the same
//! validation before an app is built around them.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use sim_runtime::{
    Footprint, FootprintError, FootprintSpec, GridBounds, GridPos, ItemKind,
};

use crate::{
    components::{ActorClass, GridPosition, PerceptionField},
    explorer::ExplorerMind,
    resources::ActorRoster,
};

pub const BUILTIN_SCENARIO: &str = include_str!("data/reference_scenario.json");

/// Turn cap handed to randomly generated layouts, which tend to need more
/// room than the reference one.
const RANDOM_SCENARIO_TURN_CAP: u64 = 24;

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    pub bounds: GridBounds,
    pub turn_cap: u64,
    pub explorer: ExplorerSpec,
    #[serde(default)]
    pub sentries: Vec<SentrySpec>,
    #[serde(default)]
    pub pickups: Vec<PickupSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerSpec {
    pub start: GridPos,
    pub footprint: FootprintSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentrySpec {
    pub position: GridPos,
    pub radius: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickupSpec {
    pub position: GridPos,
    pub kind: ItemKind,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to parse scenario config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read scenario config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid SCENARIO_SEED value {value:?}")]
    InvalidSeed { value: String },
    #[error("turn cap must be at least one")]
    ZeroTurnCap,
    #[error("grid bounds must be nonempty")]
    EmptyBounds,
    #[error("{role} position {position} lies outside the {bounds} grid")]
    OutOfBounds {
        role: &'static str,
        position: GridPos,
        bounds: GridBounds,
    },
    #[error("two pickups share position {0}")]
    DuplicatePickup(GridPos),
    #[error(transparent)]
    Footprint(#[from] FootprintError),
}

impl ScenarioConfig {
    /// The reference layout: one explorer, two sentries, three pickups on
    /// a 9x9 grid.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_SCENARIO).expect("builtin scenario should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json_str(&contents)?)
    }

    /// Resolve the scenario from the environment: `SCENARIO_PATH` first,
    /// then `SCENARIO_SEED`, then the builtin layout.
    pub fn from_env() -> Result<Self, ScenarioError> {
        if let Ok(path) = std::env::var("SCENARIO_PATH") {
            return Self::from_file(Path::new(&path));
        }
        if let Ok(value) = std::env::var("SCENARIO_SEED") {
            let seed = value
                .parse::<u64>()
                .map_err(|_| ScenarioError::InvalidSeed { value })?;
            return Ok(Self::random(seed));
        }
        Ok(Self::builtin())
    }

    /// Deterministic random layout: same seed, same scenario.
    ///
    /// Sentries keep their hazard fields clear of the fixed start corner so
    /// a run is never dead on arrival.
    pub fn random(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let bounds = GridBounds::new(9, 9);
        let start = GridPos::ZERO;
        let mut taken = vec![start];

        let mut sentries = Vec::with_capacity(2);
        for _ in 0..2 {
            let radius = rng.gen_range(1..=2);
            let position = sample_cell(&mut rng, bounds, &mut taken, start, radius as i32 + 1);
            sentries.push(SentrySpec { position, radius });
        }

        let mut pickups = Vec::with_capacity(3);
        for kind in [ItemKind::Cloak, ItemKind::Exit, ItemKind::Book] {
            let position = sample_cell(&mut rng, bounds, &mut taken, start, 1);
            pickups.push(PickupSpec { position, kind });
        }

        Self {
            bounds,
            turn_cap: RANDOM_SCENARIO_TURN_CAP,
            explorer: ExplorerSpec {
                start,
                footprint: FootprintSpec::Square { radius: 1 },
            },
            sentries,
            pickups,
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.turn_cap == 0 {
            return Err(ScenarioError::ZeroTurnCap);
        }
        if self.bounds.area() == 0 {
            return Err(ScenarioError::EmptyBounds);
        }
        self.explorer.footprint.resolve()?;
        self.check_bounds("explorer", self.explorer.start)?;
        for sentry in &self.sentries {
            self.check_bounds("sentry", sentry.position)?;
            FootprintSpec::Square {
                radius: sentry.radius,
            }
            .resolve()?;
        }
        let mut pickup_cells = Vec::with_capacity(self.pickups.len());
        for pickup in &self.pickups {
            self.check_bounds("pickup", pickup.position)?;
            if pickup_cells.contains(&pickup.position) {
                return Err(ScenarioError::DuplicatePickup(pickup.position));
            }
            pickup_cells.push(pickup.position);
        }
        Ok(())
    }

    fn check_bounds(&self, role: &'static str, position: GridPos) -> Result<(), ScenarioError> {
        if self.bounds.contains(position) {
            Ok(())
        } else {
            Err(ScenarioError::OutOfBounds {
                role,
                position,
                bounds: self.bounds,
            })
        }
    }
}

fn sample_cell(
    rng: &mut SmallRng,
    bounds: GridBounds,
    taken: &mut Vec<GridPos>,
    start: GridPos,
    min_start_distance: i32,
) -> GridPos {
    loop {
        let pos = GridPos::new(
            rng.gen_range(0..bounds.width as i32),
            rng.gen_range(0..bounds.height as i32),
        );
        if taken.contains(&pos) || pos.chebyshev_distance(start) < min_start_distance {
            continue;
        }
        taken.push(pos);
        return pos;
    }
}

/// Validated scenario shared with the startup phase.
#[derive(Resource, Debug, Clone)]
pub struct ScenarioHandle(pub Arc<ScenarioConfig>);

/// Spawn the configured actors and record them in the roster, explorer
/// first, then sentries, then pickups: the registration order every
/// per-turn phase resolves in.
pub fn spawn_scenario(
    mut commands: Commands,
    scenario: Res<ScenarioHandle>,
    mut roster: ResMut<ActorRoster>,
) {
    let config = scenario.0.as_ref();
    let field = config
        .explorer
        .footprint
        .resolve()
        .expect("validated footprint should resolve");

    let explorer = commands
        .spawn((
            ActorClass::Explorer,
            GridPosition(config.explorer.start),
            PerceptionField(field),
            ExplorerMind::new(config.explorer.start),
        ))
        .id();
    roster.actors.push(explorer);
    roster.explorer = Some(explorer);

    for sentry in &config.sentries {
        let entity = commands
            .spawn((
                ActorClass::Sentry,
                GridPosition(sentry.position),
                PerceptionField(Footprint::square_with_radius(sentry.radius)),
            ))
            .id();
        roster.actors.push(entity);
    }

    for pickup in &config.pickups {
        let entity = commands
            .spawn((
                ActorClass::Pickup(pickup.kind),
                GridPosition(pickup.position),
                PerceptionField(Footprint::square_with_radius(0)),
            ))
            .id();
        roster.actors.push(entity);
    }

    tracing::info!(
        target: "veilwalk::scenario",
        actors = roster.actors.len(),
        bounds = %config.bounds,
        turn_cap = config.turn_cap,
        "scenario spawned"
    );
}
