//! Presentation-layer glyph resolution for grid views.
//!
//! Flag semantics live in `sim_schema`; this module only decides how a cell
//! is drawn when several flags share it. Precedence is fixed and tested
//! independently of any renderer.

use std::collections::HashMap;

use sim_schema::{CellFlags, CellRecord, GridBounds, GridPos};

/// Flag precedence when several features share a cell, highest first.
pub const GLYPH_PRECEDENCE: [(CellFlags, char); 8] = [
    (CellFlags::HAZARD, '#'),
    (CellFlags::EXIT, 'E'),
    (CellFlags::CLOAK, 'C'),
    (CellFlags::BOOK, 'B'),
    (CellFlags::SENTRY, 'S'),
    (CellFlags::EXPLORER, '@'),
    (CellFlags::VISITED_EXHAUSTED, 'x'),
    (CellFlags::VISITED_FRONTIER, '+'),
];

/// Glyph for an unpopulated (or all-flags-cleared) cell.
pub const GLYPH_EMPTY: char = '.';

pub fn glyph_for(flags: CellFlags) -> char {
    for (flag, glyph) in GLYPH_PRECEDENCE {
        if flags.contains(flag) {
            return glyph;
        }
    }
    GLYPH_EMPTY
}

/// Draw a bounds-sized grid, one glyph per cell, top row (highest y) first.
pub fn render_lines(records: &[CellRecord], bounds: GridBounds) -> Vec<String> {
    let mut cells: HashMap<GridPos, CellFlags> = HashMap::with_capacity(records.len());
    for record in records {
        let entry = cells.entry(record.position()).or_insert(CellFlags::empty());
        *entry |= CellFlags::from_bits_truncate(record.flags);
    }

    let mut lines = Vec::with_capacity(bounds.height as usize);
    for y in (0..bounds.height as i32).rev() {
        let mut line = String::with_capacity(bounds.width as usize);
        for x in 0..bounds.width as i32 {
            let glyph = cells
                .get(&GridPos::new(x, y))
                .map(|flags| glyph_for(*flags))
                .unwrap_or(GLYPH_EMPTY);
            line.push(glyph);
        }
        lines.push(line);
    }
    lines
}

/// OR-merge several record layers into one, sorted row-major for stable
/// output.
pub fn merge_records(layers: &[&[CellRecord]]) -> Vec<CellRecord> {
    let mut cells: HashMap<GridPos, u8> = HashMap::new();
    for layer in layers {
        for record in *layer {
            *cells.entry(record.position()).or_insert(0) |= record.flags;
        }
    }
    let mut merged: Vec<CellRecord> = cells
        .into_iter()
        .map(|(pos, flags)| CellRecord { x: pos.x, y: pos.y, flags })
        .collect();
    merged.sort_unstable_by_key(|record| (record.y, record.x));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_outranks_everything_sharing_its_cell() {
        let flags = CellFlags::HAZARD | CellFlags::SENTRY | CellFlags::EXPLORER;
        assert_eq!(glyph_for(flags), '#');
    }

    #[test]
    fn sentry_outranks_explorer_and_visitation() {
        let flags = CellFlags::SENTRY | CellFlags::EXPLORER | CellFlags::VISITED_FRONTIER;
        assert_eq!(glyph_for(flags), 'S');
        assert_eq!(glyph_for(CellFlags::VISITED_FRONTIER), '+');
        assert_eq!(glyph_for(CellFlags::VISITED_EXHAUSTED), 'x');
        assert_eq!(glyph_for(CellFlags::empty()), GLYPH_EMPTY);
    }

    #[test]
    fn render_draws_top_row_first() {
        let records = vec![
            CellRecord::new(GridPos::new(0, 0), CellFlags::EXPLORER),
            CellRecord::new(GridPos::new(2, 2), CellFlags::EXIT),
            CellRecord::new(GridPos::new(1, 1), CellFlags::HAZARD),
        ];
        let lines = render_lines(&records, GridBounds::new(3, 3));
        assert_eq!(lines, vec!["..E", ".#.", "@.."]);
    }

    #[test]
    fn merge_combines_layers_by_position() {
        let board = [CellRecord::new(GridPos::new(1, 1), CellFlags::HAZARD)];
        let visits = [
            CellRecord::new(GridPos::new(1, 1), CellFlags::VISITED_FRONTIER),
            CellRecord::new(GridPos::new(0, 0), CellFlags::VISITED_EXHAUSTED),
        ];
        let merged = merge_records(&[&board, &visits]);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged[0].flags,
            CellFlags::VISITED_EXHAUSTED.bits(),
            "row-major sort puts (0, 0) first"
        );
        assert_eq!(
            merged[1].flags,
            (CellFlags::HAZARD | CellFlags::VISITED_FRONTIER).bits()
        );
    }
}
