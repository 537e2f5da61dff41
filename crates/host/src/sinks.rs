//! Collaborators that only log what the engine asks of them.
//!
//! A real embedder would forward these calls to its scene graph, economy and
//! damage model. The host keeps the engine observable without any of those.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use battle_core::{ActorId, Handle, ObserverId, PickupKind, Position, SplashProfile};
use battle_runtime::{
    ImpactSink, ObserverConnection, PickupRewards, Representation, RepresentationBuilder,
};

#[derive(Default)]
pub struct LoggingBuilder {
    next: AtomicU64,
}

#[async_trait]
impl RepresentationBuilder for LoggingBuilder {
    async fn build(&self, representation: Representation) -> Handle {
        let handle = Handle::new(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        debug!(target: "host::scene", %handle, ?representation, "built");
        handle
    }
}

pub struct LoggingConnection {
    observer: ObserverId,
}

impl LoggingConnection {
    pub fn new(observer: ObserverId) -> Self {
        Self { observer }
    }
}

#[async_trait]
impl ObserverConnection for LoggingConnection {
    async fn share(&self, handles: &[Handle]) {
        debug!(target: "host::net", observer = %self.observer, ?handles, "share");
    }

    async fn unshare(&self, handles: &[Handle]) {
        debug!(target: "host::net", observer = %self.observer, ?handles, "unshare");
    }
}

pub struct LoggingRewards;

#[async_trait]
impl PickupRewards for LoggingRewards {
    async fn grant(&self, kind: PickupKind, actor: ActorId) {
        info!(target: "host::economy", %kind, %actor, "reward granted");
    }
}

pub struct LoggingImpacts;

#[async_trait]
impl ImpactSink for LoggingImpacts {
    async fn splash(&self, source: ActorId, center: Position, profile: &SplashProfile) {
        info!(
            target: "host::damage",
            %source,
            ?center,
            radius = profile.radius_of_min_damage,
            "splash"
        );
    }
}
