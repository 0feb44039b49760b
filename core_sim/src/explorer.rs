//! Explorer knowledge state and the depth-first movement policy.
//!
//! The explorer sees the world only through its perceived map, accumulated
//! from perception deliveries, and walks an online depth-first search over
//! it: unvisited candidates first, re-entered frontier cells second, stack
//! backtracking when nothing is left. A cell is marked exhausted as soon as
//! it has no unvisited safe neighbor, which keeps exhaustion monotone and
//! every run over a finite grid terminating.

use std::collections::HashMap;

use bevy::prelude::*;
use sim_runtime::{CellFlags, Footprint, GridBounds, GridPos, ItemKind};

use crate::{
    components::{ActorClass, GridPosition},
    resources::{ActorRoster, RunOutcome, RunState, SimulationConfig, SimulationTick},
};

/// Private, persistent knowledge owned by the explorer entity. Nothing here
/// is ever written to the shared board.
#[derive(Component, Debug, Clone)]
pub struct ExplorerMind {
    /// Sensed cell content per position, merged across turns, never cleared.
    perceived: HashMap<GridPos, CellFlags>,
    /// VISITED_FRONTIER or VISITED_EXHAUSTED per visited position.
    visits: HashMap<GridPos, CellFlags>,
    /// Depth-first trail; the top is the current position.
    stack: Vec<GridPos>,
    /// Every position ever occupied, backtrack revisits included.
    path: Vec<GridPos>,
    /// First-seen positions of sensed sentries.
    sightings: Vec<GridPos>,
    /// Consumed pickups, in consumption order.
    collected: Vec<ItemKind>,
}

/// One movement-phase resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    /// Step into an unvisited candidate.
    Advance(GridPos),
    /// Re-enter a visited frontier candidate to probe further.
    Probe(GridPos),
    /// Unwind one step toward the start.
    Backtrack(GridPos),
    /// Nothing left to explore and nothing to unwind.
    Exhausted,
}

impl MoveDecision {
    pub fn target(self) -> Option<GridPos> {
        match self {
            MoveDecision::Advance(pos)
            | MoveDecision::Probe(pos)
            | MoveDecision::Backtrack(pos) => Some(pos),
            MoveDecision::Exhausted => None,
        }
    }
}

impl ExplorerMind {
    pub fn new(start: GridPos) -> Self {
        Self {
            perceived: HashMap::new(),
            visits: HashMap::new(),
            stack: vec![start],
            path: vec![start],
            sightings: Vec::new(),
            collected: Vec::new(),
        }
    }

    /// Merge sensed flags into the perceived map.
    pub fn perceive(&mut self, cell: GridPos, flags: CellFlags) {
        let entry = self.perceived.entry(cell).or_insert(CellFlags::empty());
        *entry |= flags;
    }

    pub fn perceived(&self, cell: GridPos) -> CellFlags {
        self.perceived.get(&cell).copied().unwrap_or(CellFlags::empty())
    }

    pub fn perceived_cells(&self) -> impl Iterator<Item = (GridPos, CellFlags)> + '_ {
        self.perceived.iter().map(|(pos, flags)| (*pos, *flags))
    }

    pub fn visit_state(&self, cell: GridPos) -> CellFlags {
        self.visits.get(&cell).copied().unwrap_or(CellFlags::empty())
    }

    pub fn visited_cells(&self) -> impl Iterator<Item = (GridPos, CellFlags)> + '_ {
        self.visits.iter().map(|(pos, flags)| (*pos, *flags))
    }

    fn mark_frontier(&mut self, cell: GridPos) {
        if !self.visit_state(cell).contains(CellFlags::VISITED_EXHAUSTED) {
            self.visits.insert(cell, CellFlags::VISITED_FRONTIER);
        }
    }

    // Replaces any frontier mark; the two bits are mutually exclusive.
    fn mark_exhausted(&mut self, cell: GridPos) {
        self.visits.insert(cell, CellFlags::VISITED_EXHAUSTED);
    }

    pub fn frontier_count(&self) -> usize {
        self.visits
            .values()
            .filter(|flags| flags.contains(CellFlags::VISITED_FRONTIER))
            .count()
    }

    pub fn exhausted_count(&self) -> usize {
        self.visits
            .values()
            .filter(|flags| flags.contains(CellFlags::VISITED_EXHAUSTED))
            .count()
    }

    pub fn record_sighting(&mut self, cell: GridPos) {
        if !self.sightings.contains(&cell) {
            self.sightings.push(cell);
        }
    }

    pub fn record_pickup(&mut self, kind: ItemKind) {
        self.collected.push(kind);
    }

    pub fn path(&self) -> &[GridPos] {
        &self.path
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn sightings(&self) -> &[GridPos] {
        &self.sightings
    }

    pub fn collected(&self) -> &[ItemKind] {
        &self.collected
    }

    /// Candidate sets around `current`, both in neighborhood scan order.
    ///
    /// Set A holds in-bounds neighbors that are neither known hazards nor
    /// exhausted; set B is the subset of A that is still unvisited.
    pub fn candidate_sets(
        &self,
        current: GridPos,
        bounds: GridBounds,
    ) -> (Vec<GridPos>, Vec<GridPos>) {
        let mut set_a = Vec::new();
        let mut set_b = Vec::new();
        for offset in Footprint::neighborhood().offsets() {
            let cell = current + *offset;
            if !bounds.contains(cell) {
                continue;
            }
            if self.perceived(cell).contains(CellFlags::HAZARD) {
                continue;
            }
            let visit = self.visit_state(cell);
            if visit.contains(CellFlags::VISITED_EXHAUSTED) {
                continue;
            }
            set_a.push(cell);
            if !visit.contains(CellFlags::VISITED_FRONTIER) {
                set_b.push(cell);
            }
        }
        (set_a, set_b)
    }

    /// Resolve one movement turn. Mutates visitation state, the stack and
    /// the path log; the caller applies the returned target.
    ///
    /// Ties always break to the first candidate in scan order, so repeated
    /// invocation on identical state yields the identical decision.
    pub fn plan_move(&mut self, current: GridPos, bounds: GridBounds) -> MoveDecision {
        self.mark_frontier(current);
        let (set_a, set_b) = self.candidate_sets(current, bounds);

        if let Some(&next) = set_b.first() {
            self.stack.push(next);
            self.path.push(next);
            return MoveDecision::Advance(next);
        }

        // No unvisited neighbor is left, so the current cell is fully
        // explored no matter which branch moves us off it.
        self.mark_exhausted(current);

        if let Some(&next) = set_a.first() {
            self.stack.push(next);
            self.path.push(next);
            return MoveDecision::Probe(next);
        }

        if self.stack.last() == Some(&current) {
            self.stack.pop();
        }
        match self.stack.last().copied() {
            Some(back) => {
                self.path.push(back);
                MoveDecision::Backtrack(back)
            }
            None => MoveDecision::Exhausted,
        }
    }
}

pub fn resolve_movement(
    config: Res<SimulationConfig>,
    roster: Res<ActorRoster>,
    tick: Res<SimulationTick>,
    mut outcome: ResMut<RunOutcome>,
    mut actors: Query<(&ActorClass, &mut GridPosition)>,
    mut minds: Query<&mut ExplorerMind>,
) {
    let turn = tick.0 + 1;
    for &entity in &roster.actors {
        let (class, mut position) = actors
            .get_mut(entity)
            .expect("rostered actor lost its components");
        match class {
            // sentries and pickups are stationary
            ActorClass::Sentry | ActorClass::Pickup(_) => {}
            ActorClass::Explorer => {
                let mut mind = minds
                    .get_mut(entity)
                    .expect("explorer lost its mind component");
                let decision = mind.plan_move(position.0, config.bounds);
                log::debug!(
                    "turn {turn}: explorer at {} resolved {:?}",
                    position.0,
                    decision
                );
                match decision.target() {
                    Some(next) => position.0 = next,
                    None => {
                        tracing::info!(
                            target: "veilwalk::explorer",
                            turn,
                            "exploration space exhausted"
                        );
                        outcome.finish(RunState::Exhausted, turn);
                        return;
                    }
                }
            }
        }
    }
}
