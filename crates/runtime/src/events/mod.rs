//! Topic-based event bus for battle events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Publishing never blocks and never fails; events with
//! no subscribers are dropped.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{EffectEvent, MineEvent, PickupEvent};
