//! Event types for different topics.

use std::time::Duration;

use battle_core::{ActorId, EffectKind, Handle, PickupKind, Position};
use serde::{Deserialize, Serialize};

/// Pickup state changes that outer layers may broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickupEvent {
    /// The spawn area of a pickup became visible.
    RegionExposed {
        index: usize,
        kind: PickupKind,
        region: Handle,
    },
    /// A pickup started waiting for its next spawn.
    CooldownStarted {
        index: usize,
        kind: PickupKind,
        duration: Duration,
    },
    /// A pickup appeared in the world.
    Spawned {
        index: usize,
        kind: PickupKind,
        entity: Handle,
        has_parachute: bool,
        /// `true` when the spawn was forced by a drop request.
        forced: bool,
    },
    Taken {
        index: usize,
        kind: PickupKind,
        actor: ActorId,
    },
}

/// Combat effect lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    Activated {
        owner: ActorId,
        kind: EffectKind,
        handle: Handle,
    },
    /// A deactivation arrived during the grace window and was queued.
    DeactivationDeferred { owner: ActorId, kind: EffectKind },
    Deactivated { owner: ActorId, kind: EffectKind },
    Prolonged {
        owner: ActorId,
        kind: EffectKind,
        remaining: Duration,
    },
    Detonated {
        owner: ActorId,
        kind: EffectKind,
        center: Position,
    },
    EmpApplied {
        owner: ActorId,
        targets: Vec<ActorId>,
        stripped: usize,
    },
}

/// Minefield notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MineEvent {
    Armed {
        owner: ActorId,
        index: u32,
        position: Position,
    },
    Triggered {
        owner: ActorId,
        index: u32,
        by: ActorId,
    },
    /// The mine left the field, either after detonating or on expiry.
    Cleared { owner: ActorId, index: u32 },
}
