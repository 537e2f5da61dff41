pub mod common;
pub mod effect;
pub mod pickup;
pub mod timed;

// Re-export common types
pub use common::{ActorId, ActorTag, Handle, ObserverId, Position, TeamId};

// Re-export effect types
pub use effect::EffectKind;

// Re-export pickup types
pub use pickup::{PickupKind, Placement, PlacementTable};

// Re-export timed state
pub use timed::TimedState;
