//! Interfaces to the collaborators that live outside the engine.
//!
//! The engine never looks inside a [`Handle`] and never talks to the network,
//! the damage model or the economy directly. Embedders implement these traits
//! on top of their transport, presentation templates and world model.
use std::time::Duration;

use async_trait::async_trait;
use battle_core::{ActorId, EffectKind, Handle, PickupKind, Position, SplashProfile};

/// Builds the outbound representation of a pickup or effect.
#[async_trait]
pub trait RepresentationBuilder: Send + Sync {
    /// Creates a world entity for `representation` and returns its handle.
    async fn build(&self, representation: Representation) -> Handle;
}

/// Semantic description of a world object handed to the representation builder.
#[derive(Clone, Debug, PartialEq)]
pub enum Representation {
    /// Spawn-area marker of a pickup.
    PickupRegion { kind: PickupKind, position: Position },
    /// The collectible box itself.
    PickupBox {
        kind: PickupKind,
        position: Position,
        has_parachute: bool,
    },
    Effect(EffectDescriptor),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectDescriptor {
    pub owner: ActorId,
    pub kind: EffectKind,
    /// Duration advertised to clients. `None` for effects without an end.
    pub duration: Option<Duration>,
    pub detail: EffectDetail,
}

/// Kind-specific attributes attached to an effect representation.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectDetail {
    Plain,
    Splash(SplashProfile),
    Mine {
        position: Position,
        triggering_area: f32,
        begin_hide_distance: f32,
        hide_range: f32,
        splash: SplashProfile,
    },
    BackhitDefence {
        multiplier: f32,
    },
    Emp {
        radius: f32,
    },
}

/// One connected client.
///
/// Both calls must be resolved before they return; the engine awaits them and
/// never issues two calls for the same connection concurrently.
#[async_trait]
pub trait ObserverConnection: Send + Sync {
    async fn share(&self, handles: &[Handle]);

    async fn unshare(&self, handles: &[Handle]);
}

/// Applies the gameplay benefit of a collected pickup (health, currency, stats).
#[async_trait]
pub trait PickupRewards: Send + Sync {
    async fn grant(&self, kind: PickupKind, actor: ActorId);
}

/// Receives area detonations for the damage model.
#[async_trait]
pub trait ImpactSink: Send + Sync {
    async fn splash(&self, source: ActorId, center: Position, profile: &SplashProfile);
}
