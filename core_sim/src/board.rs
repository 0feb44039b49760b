//! Shared world board, rebuilt from actor state at the start of every turn.

use std::collections::HashMap;

use bevy::prelude::*;
use sim_runtime::{CellFlags, Footprint, GridBounds, GridPos};

use crate::{
    components::{ActorClass, GridPosition, PerceptionField},
    resources::{ActorRoster, SimulationConfig},
};

/// Sparse projection of current actor state onto the grid.
///
/// Entries merge on write: `put` ORs new flags into an occupied cell and
/// never replaces existing ones. The board is cleared and rebuilt each turn;
/// it is a view of the present, not a record of the past.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldBoard {
    cells: HashMap<GridPos, CellFlags>,
}

impl WorldBoard {
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn put(&mut self, pos: GridPos, flags: CellFlags) {
        let entry = self.cells.entry(pos).or_insert(CellFlags::empty());
        *entry |= flags;
    }

    pub fn get(&self, pos: GridPos) -> Option<CellFlags> {
        self.cells.get(&pos).copied()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.cells.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, CellFlags)> + '_ {
        self.cells.iter().map(|(pos, flags)| (*pos, *flags))
    }
}

/// Project one actor onto the board.
///
/// Sentries stamp HAZARD over their in-bounds footprint but never over their
/// own cell, which carries SENTRY instead; pickups and the explorer mark
/// their own cell only.
fn project_actor(
    board: &mut WorldBoard,
    bounds: GridBounds,
    position: GridPos,
    field: &Footprint,
    class: ActorClass,
) {
    match class {
        ActorClass::Sentry => {
            for offset in field.offsets() {
                if *offset == GridPos::ZERO {
                    continue;
                }
                let cell = position + *offset;
                if bounds.contains(cell) {
                    board.put(cell, CellFlags::HAZARD);
                }
            }
            board.put(position, CellFlags::SENTRY);
        }
        ActorClass::Pickup(kind) => board.put(position, kind.flag()),
        ActorClass::Explorer => board.put(position, CellFlags::EXPLORER),
    }
}

pub fn rebuild_world_board(
    mut board: ResMut<WorldBoard>,
    roster: Res<ActorRoster>,
    config: Res<SimulationConfig>,
    actors: Query<(&GridPosition, &PerceptionField, &ActorClass)>,
) {
    board.clear();
    for &entity in &roster.actors {
        let (position, field, class) = actors
            .get(entity)
            .expect("rostered actor lost its components");
        project_actor(&mut board, config.bounds, position.0, &field.0, *class);
    }
}
