//! Shared runtime utilities for Veilwalk.
//!
//! This crate re-exports the data contracts from `sim_schema` and carries the
//! helpers that operate on those types (perception footprints, display glyph
//! resolution) without depending on the full Bevy runtime in `core_sim`.

mod display;
mod footprint;

pub use display::{glyph_for, merge_records, render_lines, GLYPH_EMPTY, GLYPH_PRECEDENCE};
pub use footprint::{Footprint, FootprintError, FootprintSpec, MAX_FOOTPRINT_RADIUS};

pub use sim_schema::*;
