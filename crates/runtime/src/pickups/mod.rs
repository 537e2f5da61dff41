//! Pickups: supply boxes that respawn on a timer and gold that only drops on request.

mod manager;
mod pickup;
mod policy;

pub use manager::PickupLifecycleManager;
pub use pickup::Pickup;
pub use policy::{CappedIntervalPolicy, GoldDropPolicy};
