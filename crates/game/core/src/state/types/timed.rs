//! Three-state lifecycle shared by pickups and combat effects.

use std::time::Duration;

/// Externally visible state of a timed transient object.
///
/// Pickups read `Active` as "present in the world and collectible"; combat
/// effects read `Cooldown` as the activation grace window and `Active` as
/// "fully active, may be deactivated".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimedState {
    Idle,
    /// Waiting for the transition to `Active`. Carries the remaining time when
    /// read back, or the full duration when passed to a state machine.
    Cooldown(Duration),
    Active,
}

impl TimedState {
    pub const fn is_idle(&self) -> bool {
        matches!(self, TimedState::Idle)
    }

    pub const fn is_cooldown(&self) -> bool {
        matches!(self, TimedState::Cooldown(_))
    }

    pub const fn is_active(&self) -> bool {
        matches!(self, TimedState::Active)
    }
}
