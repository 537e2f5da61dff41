//! Identifiers and per-object state shared across the battle.
//!
//! Everything here is plain data: the runtime wraps these types in its own
//! locks and schedules, and the content loaders build them from static files.
pub mod types;

pub use types::{
    ActorId, ActorTag, EffectKind, Handle, ObserverId, PickupKind, Placement, PlacementTable,
    Position, TeamId, TimedState,
};
