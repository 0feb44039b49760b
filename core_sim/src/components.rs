use bevy::prelude::*;
use sim_runtime::{Footprint, GridPos, ItemKind};

/// Absolute grid position of an actor; mutated only during the movement
/// phase.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition(pub GridPos);

/// Static perception footprint sampled around the actor every turn. For
/// sentries the same footprint doubles as the projected hazard field.
#[derive(Component, Debug, Clone)]
pub struct PerceptionField(pub Footprint);

/// Closed set of actor variants, dispatched by pattern match in the
/// perception and movement phases.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorClass {
    /// Stationary watcher projecting a hazard field over its footprint.
    Sentry,
    /// Stationary consumable item.
    Pickup(ItemKind),
    /// The autonomous explorer.
    Explorer,
}
