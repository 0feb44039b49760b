//! Perception footprints: the relative offsets an actor samples each turn.

use serde::{Deserialize, Serialize};
use sim_schema::GridPos;
use thiserror::Error;

/// Largest square radius a scenario may request. Anything bigger would scan
/// more cells than the reference grids contain.
pub const MAX_FOOTPRINT_RADIUS: u32 = 16;

/// Immutable list of relative offsets, in the order the generator produced
/// them. That order is load-bearing: the explorer's movement candidates are
/// scanned in it, which is what makes runs reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    offsets: Vec<GridPos>,
}

impl Footprint {
    /// Every offset in the (2r+1)² square around the origin, x-major.
    /// Radius zero is the single-cell footprint used by pickups.
    pub fn square_with_radius(radius: u32) -> Self {
        let radius = radius as i32;
        let side = (2 * radius + 1) as usize;
        let mut offsets = Vec::with_capacity(side * side);
        for x in -radius..=radius {
            for y in -radius..=radius {
                offsets.push(GridPos::new(x, y));
            }
        }
        Self { offsets }
    }

    /// The twelve offsets at Chebyshev distance two with the corners cut:
    /// a far-sighted field that senses nothing adjacent.
    pub fn spread_ring() -> Self {
        let offsets = vec![
            GridPos::new(-2, -1),
            GridPos::new(-2, 0),
            GridPos::new(-2, 1),
            GridPos::new(2, -1),
            GridPos::new(2, 0),
            GridPos::new(2, 1),
            GridPos::new(-1, 2),
            GridPos::new(0, 2),
            GridPos::new(1, 2),
            GridPos::new(-1, -2),
            GridPos::new(0, -2),
            GridPos::new(1, -2),
        ];
        Self { offsets }
    }

    /// Radius-one square with the origin excluded: the eight movement
    /// candidates around a cell, in square scan order.
    pub fn neighborhood() -> Self {
        let mut square = Self::square_with_radius(1);
        square.offsets.retain(|offset| *offset != GridPos::ZERO);
        square
    }

    pub fn offsets(&self) -> &[GridPos] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offsets translated to absolute positions around `origin`.
    pub fn absolute(&self, origin: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        self.offsets.iter().map(move |offset| origin + *offset)
    }
}

#[derive(Debug, Error)]
pub enum FootprintError {
    #[error("footprint radius {radius} exceeds the maximum of {MAX_FOOTPRINT_RADIUS}")]
    RadiusTooLarge { radius: u32 },
}

/// Serde-facing footprint description, resolved once at scenario load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FootprintSpec {
    Square { radius: u32 },
    SpreadRing,
}

impl FootprintSpec {
    pub fn resolve(self) -> Result<Footprint, FootprintError> {
        match self {
            FootprintSpec::Square { radius } if radius > MAX_FOOTPRINT_RADIUS => {
                Err(FootprintError::RadiusTooLarge { radius })
            }
            FootprintSpec::Square { radius } => Ok(Footprint::square_with_radius(radius)),
            FootprintSpec::SpreadRing => Ok(Footprint::spread_ring()),
        }
    }
}
