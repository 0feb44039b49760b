use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::ops::Add;

use ahash::RandomState;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete grid coordinate. Value type: equality and hashing are by value,
/// and positions are never mutated in place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const ZERO: GridPos = GridPos { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chessboard distance; two cells are neighbors when this is one.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Add for GridPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangle of valid cells anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: u32,
    pub height: u32,
}

impl GridBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

bitflags! {
    /// World features occupying a single cell.
    ///
    /// Flags are additive: writes into a populated cell OR new bits in and
    /// never replace existing ones. The two VISITED bits belong to the
    /// explorer's private visitation map and must never appear on the
    /// shared board; they are mutually exclusive per cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        const HAZARD            = 0b0000_0001;
        const EXIT              = 0b0000_0010;
        const CLOAK             = 0b0000_0100;
        const BOOK              = 0b0000_1000;
        const SENTRY            = 0b0001_0000;
        const EXPLORER          = 0b0010_0000;
        const VISITED_FRONTIER  = 0b0100_0000;
        const VISITED_EXHAUSTED = 0b1000_0000;
    }
}

impl CellFlags {
    /// Items an actor can stand on without sensing them as cell content;
    /// stripped from every perception delivery.
    pub const PORTABLE: CellFlags = CellFlags::CLOAK.union(CellFlags::BOOK);

    /// Both visitation markers.
    pub const VISITED: CellFlags = CellFlags::VISITED_FRONTIER.union(CellFlags::VISITED_EXHAUSTED);
}

/// Consumable pickup variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Cloak,
    Book,
    Exit,
}

impl ItemKind {
    pub fn flag(self) -> CellFlags {
        match self {
            ItemKind::Cloak => CellFlags::CLOAK,
            ItemKind::Book => CellFlags::BOOK,
            ItemKind::Exit => CellFlags::EXIT,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Cloak => "cloak",
            ItemKind::Book => "book",
            ItemKind::Exit => "exit",
        };
        write!(f, "{name}")
    }
}

/// One populated cell in a snapshot, flags packed as raw bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub x: i32,
    pub y: i32,
    pub flags: u8,
}

impl CellRecord {
    pub fn new(pos: GridPos, flags: CellFlags) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            flags: flags.bits(),
        }
    }

    pub fn position(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SnapshotHeader {
    pub tick: u64,
    pub cell_count: u32,
    pub hash: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64, cell_count: usize) -> Self {
        Self {
            tick,
            cell_count: cell_count as u32,
            hash: 0,
        }
    }
}

/// Snapshot of the shared world board after one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub header: SnapshotHeader,
    pub cells: Vec<CellRecord>,
}

impl WorldSnapshot {
    pub fn finalize(mut self) -> Self {
        let mut hasher = snapshot_hasher();
        hasher.write_u64(self.header.tick);
        hash_records(&mut hasher, &self.cells);
        self.header.hash = hasher.finish();
        self
    }
}

/// Snapshot of the explorer's private knowledge after one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub header: SnapshotHeader,
    pub perceived: Vec<CellRecord>,
    pub visited: Vec<CellRecord>,
    pub stack_depth: u32,
    pub path_length: u32,
}

impl KnowledgeSnapshot {
    pub fn finalize(mut self) -> Self {
        let mut hasher = snapshot_hasher();
        hasher.write_u64(self.header.tick);
        hash_records(&mut hasher, &self.perceived);
        hash_records(&mut hasher, &self.visited);
        hasher.write_u32(self.stack_depth);
        hasher.write_u32(self.path_length);
        self.header.hash = hasher.finish();
        self
    }
}

// Fixed keys so snapshot hashes are stable across runs and hosts.
const HASH_SEEDS: [u64; 4] = [
    0x7645_696c_7761_6c6b,
    0x5f73_696d_5f76_3031,
    0x9e37_79b9_7f4a_7c15,
    0x2545_f491_4f6c_dd1d,
];

fn snapshot_hasher() -> impl Hasher {
    RandomState::with_seeds(HASH_SEEDS[0], HASH_SEEDS[1], HASH_SEEDS[2], HASH_SEEDS[3])
        .build_hasher()
}

fn hash_records(hasher: &mut impl Hasher, records: &[CellRecord]) {
    hasher.write_usize(records.len());
    for record in records {
        hasher.write_i32(record.x);
        hasher.write_i32(record.y);
        hasher.write_u8(record.flags);
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn encode_snapshot(snapshot: &WorldSnapshot) -> Result<Vec<u8>, SchemaError> {
    Ok(serde_json::to_vec(snapshot)?)
}

pub fn encode_knowledge(snapshot: &KnowledgeSnapshot) -> Result<Vec<u8>, SchemaError> {
    Ok(serde_json::to_vec(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_pos_addition_and_distance() {
        let pos = GridPos::new(2, 7) + GridPos::new(-1, 1);
        assert_eq!(pos, GridPos::new(1, 8));
        assert_eq!(pos.chebyshev_distance(GridPos::new(2, 7)), 1);
        assert_eq!(GridPos::ZERO.chebyshev_distance(GridPos::new(-3, 2)), 3);
    }

    #[test]
    fn bounds_reject_edges_and_negatives() {
        let bounds = GridBounds::new(9, 9);
        assert!(bounds.contains(GridPos::ZERO));
        assert!(bounds.contains(GridPos::new(8, 8)));
        assert!(!bounds.contains(GridPos::new(9, 0)));
        assert!(!bounds.contains(GridPos::new(0, 9)));
        assert!(!bounds.contains(GridPos::new(-1, 4)));
        assert_eq!(bounds.area(), 81);
    }

    #[test]
    fn item_kinds_map_to_their_flags() {
        assert_eq!(ItemKind::Cloak.flag(), CellFlags::CLOAK);
        assert_eq!(ItemKind::Book.flag(), CellFlags::BOOK);
        assert_eq!(ItemKind::Exit.flag(), CellFlags::EXIT);
        assert!(CellFlags::PORTABLE.contains(ItemKind::Cloak.flag()));
        assert!(!CellFlags::PORTABLE.contains(ItemKind::Exit.flag()));
    }

    #[test]
    fn snapshot_hash_is_stable_and_content_sensitive() {
        let cells = vec![
            CellRecord::new(GridPos::new(0, 0), CellFlags::EXPLORER),
            CellRecord::new(GridPos::new(2, 7), CellFlags::SENTRY),
        ];
        let a = WorldSnapshot {
            header: SnapshotHeader::new(3, cells.len()),
            cells: cells.clone(),
        }
        .finalize();
        let b = WorldSnapshot {
            header: SnapshotHeader::new(3, cells.len()),
            cells,
        }
        .finalize();
        assert_eq!(a.header.hash, b.header.hash);

        let mut mutated = a.clone();
        mutated.cells[0].flags = CellFlags::HAZARD.bits();
        let mutated = mutated.finalize();
        assert_ne!(a.header.hash, mutated.header.hash);
    }

    #[test]
    fn snapshots_encode_to_json() {
        let snapshot = WorldSnapshot {
            header: SnapshotHeader::new(1, 1),
            cells: vec![CellRecord::new(GridPos::new(1, 4), CellFlags::EXIT)],
        }
        .finalize();
        let bytes = encode_snapshot(&snapshot).expect("encode");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.contains("\"tick\":1"));
        assert!(text.contains("\"flags\":2"));
    }
}
