//! Perception resolution for every actor variant.
//!
//! Runs once per turn, after the board rebuild:
//! 1. each rostered actor samples its footprint against the board, in
//!    registration order;
//! 2. populated cells are delivered with BOOK and CLOAK stripped; standing
//!    on an item must not read as sensed cell content, or pickup would be
//!    double-counted through generic perception;
//! 3. handlers return a [`CellSignal`] which is folded into the run
//!    outcome; a terminal signal skips every remaining delivery this turn.

use bevy::prelude::*;
use sim_runtime::{CellFlags, GridPos, ItemKind};

use crate::{
    board::WorldBoard,
    components::{ActorClass, GridPosition, PerceptionField},
    explorer::ExplorerMind,
    resources::{ActorRoster, RunOutcome, RunState, SimulationTick},
};

/// Result of delivering one populated cell to an actor handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSignal {
    Continue,
    /// A sentry sensed the explorer.
    HazardContact,
    /// A pickup sensed the explorer standing on it.
    Consumed(ItemKind),
}

/// Emitted when the explorer consumes a pickup.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCollected {
    pub kind: ItemKind,
    pub position: GridPos,
    pub turn: u64,
}

/// The mask every handler sees: the stored cell minus the portable items.
pub(crate) fn delivered_mask(raw: CellFlags) -> CellFlags {
    raw.difference(CellFlags::PORTABLE)
}

fn sentry_cell(mask: CellFlags) -> CellSignal {
    if mask.contains(CellFlags::EXPLORER) {
        CellSignal::HazardContact
    } else {
        CellSignal::Continue
    }
}

fn pickup_cell(kind: ItemKind, mask: CellFlags) -> CellSignal {
    if mask.contains(CellFlags::EXPLORER) {
        CellSignal::Consumed(kind)
    } else {
        CellSignal::Continue
    }
}

fn explorer_cell(mind: &mut ExplorerMind, cell: GridPos, mask: CellFlags) -> CellSignal {
    let sensed = mask.difference(CellFlags::EXPLORER);
    if !sensed.is_empty() {
        mind.perceive(cell, sensed);
        if sensed.contains(CellFlags::SENTRY) {
            mind.record_sighting(cell);
        }
    }
    CellSignal::Continue
}

pub fn resolve_perception(
    board: Res<WorldBoard>,
    roster: Res<ActorRoster>,
    tick: Res<SimulationTick>,
    mut outcome: ResMut<RunOutcome>,
    actors: Query<(&GridPosition, &PerceptionField, &ActorClass)>,
    mut minds: Query<&mut ExplorerMind>,
    mut collected: EventWriter<ItemCollected>,
) {
    let turn = tick.0 + 1;
    'roster: for &entity in &roster.actors {
        let (position, field, class) = actors
            .get(entity)
            .expect("rostered actor lost its components");
        for offset in field.0.offsets() {
            let cell = position.0 + *offset;
            let Some(raw) = board.get(cell) else {
                continue;
            };
            let mask = delivered_mask(raw);
            let signal = match class {
                ActorClass::Sentry => sentry_cell(mask),
                ActorClass::Pickup(kind) => pickup_cell(*kind, mask),
                ActorClass::Explorer => {
                    let mut mind = minds
                        .get_mut(entity)
                        .expect("explorer lost its mind component");
                    explorer_cell(&mut mind, cell, mask)
                }
            };
            match signal {
                CellSignal::Continue => {}
                CellSignal::HazardContact => {
                    tracing::info!(
                        target: "veilwalk::perception",
                        cell = %cell,
                        turn,
                        "explorer detected by sentry"
                    );
                    outcome.finish(RunState::Caught, turn);
                    break 'roster;
                }
                CellSignal::Consumed(kind) => {
                    if let Some(explorer) = roster.explorer {
                        if let Ok(mut mind) = minds.get_mut(explorer) {
                            mind.record_pickup(kind);
                        }
                    }
                    collected.send(ItemCollected {
                        kind,
                        position: cell,
                        turn,
                    });
                    if kind == ItemKind::Exit {
                        outcome.finish(RunState::Escaped, turn);
                        break 'roster;
                    }
                }
            }
        }
    }
}

/// Log consumed pickups; the collection itself happens in
/// [`resolve_perception`].
pub fn log_collections(mut events: EventReader<ItemCollected>) {
    for event in events.read() {
        tracing::info!(
            target: "veilwalk::perception",
            kind = %event.kind,
            position = %event.position,
            turn = event.turn,
            "pickup collected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_strips_book_and_cloak_but_nothing_else() {
        let raw = CellFlags::HAZARD | CellFlags::BOOK | CellFlags::CLOAK | CellFlags::EXPLORER;
        let mask = delivered_mask(raw);
        assert!(!mask.intersects(CellFlags::PORTABLE));
        assert_eq!(mask, CellFlags::HAZARD | CellFlags::EXPLORER);

        // the exit is not portable and survives delivery
        assert!(delivered_mask(CellFlags::EXIT).contains(CellFlags::EXIT));
    }

    #[test]
    fn sentry_signals_only_on_the_explorer_flag() {
        assert_eq!(
            sentry_cell(CellFlags::EXPLORER | CellFlags::HAZARD),
            CellSignal::HazardContact
        );
        assert_eq!(sentry_cell(CellFlags::HAZARD), CellSignal::Continue);
        assert_eq!(sentry_cell(CellFlags::SENTRY), CellSignal::Continue);
    }

    #[test]
    fn pickup_signals_its_own_kind() {
        assert_eq!(
            pickup_cell(ItemKind::Exit, CellFlags::EXIT | CellFlags::EXPLORER),
            CellSignal::Consumed(ItemKind::Exit)
        );
        assert_eq!(pickup_cell(ItemKind::Book, CellFlags::BOOK), CellSignal::Continue);
    }

    #[test]
    fn explorer_handler_drops_its_own_flag_and_skips_empty_remainders() {
        let mut mind = ExplorerMind::new(GridPos::ZERO);
        let cell = GridPos::new(2, 7);

        explorer_cell(&mut mind, cell, CellFlags::SENTRY | CellFlags::EXPLORER);
        assert_eq!(mind.perceived(cell), CellFlags::SENTRY);
        assert_eq!(mind.sightings(), &[cell]);

        // own flag alone leaves no trace
        let own = GridPos::new(0, 0);
        explorer_cell(&mut mind, own, CellFlags::EXPLORER);
        assert_eq!(mind.perceived(own), CellFlags::empty());

        // repeat sightings are not re-recorded
        explorer_cell(&mut mind, cell, CellFlags::SENTRY);
        assert_eq!(mind.sightings().len(), 1);
    }
}
