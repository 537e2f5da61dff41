//! Passive modules that keep an effect alive on their actor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use battle_core::{ActorId, EffectKind};

use crate::actors::BattleActor;
use crate::context::BattleContext;
use crate::effects::Effect;

/// A module whose effect should always be present on its actor.
///
/// The battle re-asserts every installed module on each tick. Implementations
/// must create at most one live effect per actor no matter how often they are
/// called.
#[async_trait]
pub trait AlwaysActiveModule: Send + Sync {
    fn owner(&self) -> ActorId;

    fn effect_kind(&self) -> EffectKind;

    /// Re-asserts the effect. Returns `true` if a new instance was activated.
    async fn activate(&self) -> bool;
}

/// Reduces damage taken from behind while installed.
pub struct BackhitDefenceModule {
    actor: Arc<BattleActor>,
    ctx: Arc<BattleContext>,
    multiplier: f32,
}

impl BackhitDefenceModule {
    /// Reads the multiplier from the battle configuration once.
    pub fn new(actor: Arc<BattleActor>, ctx: Arc<BattleContext>) -> Self {
        let multiplier = ctx.config.backhit_defence.multiplier;
        Self {
            actor,
            ctx,
            multiplier,
        }
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }
}

#[async_trait]
impl AlwaysActiveModule for BackhitDefenceModule {
    fn owner(&self) -> ActorId {
        self.actor.id()
    }

    fn effect_kind(&self) -> EffectKind {
        EffectKind::BackhitDefence
    }

    async fn activate(&self) -> bool {
        if !self.actor.is_alive() || self.actor.effects().contains(EffectKind::BackhitDefence) {
            return false;
        }

        let effect =
            Effect::backhit_defence(&self.actor, Arc::clone(&self.ctx), self.multiplier);
        let activated = effect.activate().await;
        debug!(
            target: "battle::module",
            owner = %self.actor.id(),
            activated,
            "backhit defence asserted"
        );
        activated
    }
}
