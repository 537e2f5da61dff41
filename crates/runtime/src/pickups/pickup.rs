//! A single pickup and its state transitions.
//!
//! `TimedState::Active` means the box is present in the world and can be
//! collected. The entity handle is set exactly while the pickup is present.
//! Supply kinds also keep their spawn region exposed from battle start on;
//! a gold pickup reveals its region only while it is present.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use battle_core::{Handle, PickupKind, Placement, Position, TimedState};

use crate::actors::BattleActor;
use crate::api::{PickupRewards, Representation};
use crate::context::BattleContext;
use crate::effects::Effect;
use crate::events::PickupEvent;
use crate::timed::{CooldownTarget, Generation, TimedStateMachine};
use crate::visibility::Observer;

struct PickupSlot {
    machine: TimedStateMachine<Pickup>,
    region: Option<Handle>,
    entity: Option<Handle>,
}

pub struct Pickup {
    index: usize,
    kind: PickupKind,
    placement: Placement,
    ctx: Arc<BattleContext>,
    slot: Mutex<PickupSlot>,
}

impl Pickup {
    pub(crate) fn new(
        index: usize,
        kind: PickupKind,
        placement: Placement,
        ctx: Arc<BattleContext>,
    ) -> Arc<Self> {
        let scheduler = ctx.scheduler.clone();
        Arc::new_cyclic(|this| Self {
            index,
            kind,
            placement,
            ctx,
            slot: Mutex::new(PickupSlot {
                machine: TimedStateMachine::new(scheduler, this.clone()),
                region: None,
                entity: None,
            }),
        })
    }

    /// Stable position of this pickup in the battle's arena.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> PickupKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.placement.position
    }

    pub fn has_parachute(&self) -> bool {
        self.placement.has_parachute
    }

    pub async fn state(&self) -> TimedState {
        self.slot.lock().await.machine.state()
    }

    pub async fn is_present(&self) -> bool {
        self.state().await.is_active()
    }

    pub async fn entity(&self) -> Option<Handle> {
        self.slot.lock().await.entity
    }

    pub async fn region(&self) -> Option<Handle> {
        self.slot.lock().await.region
    }

    /// Exposes the supply region and starts the first cooldown.
    pub(crate) async fn initialize(&self, delay: Duration) {
        let mut slot = self.slot.lock().await;
        if self.kind.is_supply() {
            let region = self.ensure_region(&mut slot).await;
            self.ctx.observers.share_all(&[region]).await;
            self.ctx.publish(PickupEvent::RegionExposed {
                index: self.index,
                kind: self.kind,
                region,
            });
        }
        self.start_cooldown(&mut slot, delay);
    }

    /// Promotes a cooldown whose deadline has passed. Returns whether it spawned.
    pub(crate) async fn advance(&self, now: Instant) -> bool {
        let mut slot = self.slot.lock().await;
        if !slot.machine.is_due(now) {
            return false;
        }
        self.appear(&mut slot, false).await;
        true
    }

    /// Spawns immediately unless already present.
    pub(crate) async fn force_drop(&self) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.machine.state().is_active() {
            return false;
        }
        self.appear(&mut slot, true).await;
        true
    }

    /// Collects the pickup for `actor`.
    ///
    /// Returns `false` if the pickup is not present. Otherwise hides it, grants
    /// the reward, applies or prolongs the boost effect for boost kinds and,
    /// for supply kinds, starts the respawn cooldown.
    pub(crate) async fn take(&self, actor: &Arc<BattleActor>, rewards: &dyn PickupRewards) -> bool {
        let mut slot = self.slot.lock().await;
        if !slot.machine.state().is_active() {
            debug!(
                target: "battle::pickup",
                index = self.index,
                kind = %self.kind,
                actor = %actor.id(),
                "take ignored, pickup not present"
            );
            return false;
        }

        slot.machine.set_state(TimedState::Idle);
        let mut revoked = Vec::with_capacity(2);
        revoked.extend(slot.entity.take());
        if !self.kind.is_supply() {
            revoked.extend(slot.region);
        }
        self.ctx.observers.unshare_all(&revoked).await;

        info!(
            target: "battle::pickup",
            index = self.index,
            kind = %self.kind,
            actor = %actor.id(),
            "pickup taken"
        );
        self.ctx.publish(PickupEvent::Taken {
            index: self.index,
            kind: self.kind,
            actor: actor.id(),
        });

        rewards.grant(self.kind, actor.id()).await;
        self.apply_boost(actor).await;

        if let Some(cooldown) = self.ctx.config.pickups.respawn_cooldown(self.kind) {
            self.start_cooldown(&mut slot, cooldown);
        }
        true
    }

    /// Shares what `observer` should currently see of this pickup.
    pub(crate) async fn share_to(&self, observer: &Observer) -> usize {
        let slot = self.slot.lock().await;
        let Some(region) = slot.region else {
            return 0;
        };
        if !self.kind.is_supply() && slot.machine.state().is_idle() {
            return 0;
        }

        let mut handles = vec![region];
        handles.extend(slot.entity);
        observer.share(&handles).await
    }

    pub(crate) async fn unshare_to(&self, observer: &Observer) -> usize {
        let slot = self.slot.lock().await;
        let handles: Vec<_> = slot.region.into_iter().chain(slot.entity).collect();
        if handles.is_empty() {
            return 0;
        }
        observer.unshare(&handles).await
    }

    async fn apply_boost(&self, actor: &Arc<BattleActor>) {
        let Some(kind) = self.kind.boost_effect() else {
            return;
        };
        let duration = self.ctx.config.pickups.boost_duration();

        if let Some(existing) = actor.effects().find(kind)
            && existing.prolong(duration).await
        {
            return;
        }
        if let Some(effect) = Effect::boost(actor, Arc::clone(&self.ctx), kind, duration) {
            effect.activate().await;
        }
    }

    async fn ensure_region(&self, slot: &mut PickupSlot) -> Handle {
        if let Some(region) = slot.region {
            return region;
        }
        let region = self
            .ctx
            .builder
            .build(Representation::PickupRegion {
                kind: self.kind,
                position: self.placement.position,
            })
            .await;
        slot.region = Some(region);
        region
    }

    async fn appear(&self, slot: &mut PickupSlot, forced: bool) {
        slot.machine.set_state(TimedState::Active);

        let region = self.ensure_region(slot).await;
        let entity = self
            .ctx
            .builder
            .build(Representation::PickupBox {
                kind: self.kind,
                position: self.placement.position,
                has_parachute: self.placement.has_parachute,
            })
            .await;
        slot.entity = Some(entity);

        self.ctx.observers.share_all(&[region, entity]).await;

        info!(
            target: "battle::pickup",
            index = self.index,
            kind = %self.kind,
            entity = %entity,
            forced,
            "pickup spawned"
        );
        self.ctx.publish(PickupEvent::Spawned {
            index: self.index,
            kind: self.kind,
            entity,
            has_parachute: self.placement.has_parachute,
            forced,
        });
    }

    fn start_cooldown(&self, slot: &mut PickupSlot, duration: Duration) {
        slot.machine.set_state(TimedState::Cooldown(duration));
        debug!(
            target: "battle::pickup",
            index = self.index,
            kind = %self.kind,
            ?duration,
            "cooldown started"
        );
        self.ctx.publish(PickupEvent::CooldownStarted {
            index: self.index,
            kind: self.kind,
            duration,
        });
    }
}

#[async_trait]
impl CooldownTarget for Pickup {
    async fn cooldown_elapsed(self: Arc<Self>, generation: Generation) {
        let mut slot = self.slot.lock().await;
        if !slot.machine.is_current(generation) {
            return;
        }
        self.appear(&mut slot, false).await;
    }
}

impl std::fmt::Debug for Pickup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pickup")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("placement", &self.placement)
            .finish()
    }
}
