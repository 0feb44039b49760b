use bevy::prelude::*;
use sim_schema::{
    encode_knowledge, encode_snapshot, CellRecord, KnowledgeSnapshot, SnapshotHeader,
    WorldSnapshot,
};

use crate::{
    board::WorldBoard,
    explorer::ExplorerMind,
    resources::{RunOutcome, SimulationTick},
};

/// Read-only views of the latest completed turn, for rendering and
/// inspection. The simulation never mutates a snapshot once captured.
#[derive(Resource, Default)]
pub struct SnapshotHistory {
    pub last_board: Option<WorldSnapshot>,
    pub last_knowledge: Option<KnowledgeSnapshot>,
    pub encoded_board: Option<Vec<u8>>,
    pub encoded_knowledge: Option<Vec<u8>>,
}

pub fn capture_snapshot(
    tick: Res<SimulationTick>,
    outcome: Res<RunOutcome>,
    board: Res<WorldBoard>,
    minds: Query<&ExplorerMind>,
    mut history: ResMut<SnapshotHistory>,
) {
    // on a terminal turn the tick advance is skipped, so prefer the
    // recorded terminal turn number
    let turn = outcome.ended_on_turn.unwrap_or(tick.0);

    let mut cells: Vec<CellRecord> = board
        .iter()
        .map(|(pos, flags)| CellRecord::new(pos, flags))
        .collect();
    cells.sort_unstable_by_key(|record| (record.y, record.x));
    let board_snapshot = WorldSnapshot {
        header: SnapshotHeader::new(turn, cells.len()),
        cells,
    }
    .finalize();

    if let Ok(mind) = minds.get_single() {
        let mut perceived: Vec<CellRecord> = mind
            .perceived_cells()
            .map(|(pos, flags)| CellRecord::new(pos, flags))
            .collect();
        perceived.sort_unstable_by_key(|record| (record.y, record.x));

        let mut visited: Vec<CellRecord> = mind
            .visited_cells()
            .map(|(pos, flags)| CellRecord::new(pos, flags))
            .collect();
        visited.sort_unstable_by_key(|record| (record.y, record.x));

        let knowledge = KnowledgeSnapshot {
            header: SnapshotHeader::new(turn, perceived.len() + visited.len()),
            perceived,
            visited,
            stack_depth: mind.stack_depth() as u32,
            path_length: mind.path().len() as u32,
        }
        .finalize();

        history.encoded_knowledge =
            Some(encode_knowledge(&knowledge).expect("knowledge snapshot serialization failed"));
        history.last_knowledge = Some(knowledge);
    }

    history.encoded_board =
        Some(encode_snapshot(&board_snapshot).expect("snapshot serialization failed"));
    history.last_board = Some(board_snapshot);
}
