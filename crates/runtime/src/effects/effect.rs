//! Activation protocol shared by all combat effects.
//!
//! The embedded [`TimedStateMachine`] encodes the protocol:
//!
//! - `Idle`: inactive, no handle, not in the owner's collection.
//! - `Cooldown`: active but inside the grace window. Deactivation requests are
//!   recorded and replayed when the window ends.
//! - `Active`: active and deactivatable.
//!
//! Expiry timers are stamped with a separate counter so prolonging an effect
//! or deactivating it early turns the old timer into a no-op.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use battle_core::{
    ActorTag, EffectKind, EmpConfig, Handle, KamikadzeConfig, Mine, MineConfig, Position,
    SplashProfile, TimedState,
};

use super::link::MineLink;
use super::splash::SplashHandler;
use crate::actors::BattleActor;
use crate::api::{EffectDescriptor, EffectDetail, Representation};
use crate::context::BattleContext;
use crate::events::{EffectEvent, MineEvent};
use crate::timed::{CooldownTarget, Generation, TimedStateMachine, deadline_after};
use crate::visibility::Observer;

/// Kind-specific parameters, captured from configuration when the effect is created.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectSpec {
    Kamikadze(KamikadzeConfig),
    Mine {
        config: MineConfig,
        position: Position,
        index: u32,
    },
    BackhitDefence {
        multiplier: f32,
    },
    Emp(EmpConfig),
    Boost {
        duration: Duration,
    },
}

impl EffectSpec {
    fn grace_window(&self) -> Duration {
        match self {
            EffectSpec::Kamikadze(config) => config.grace_window(),
            _ => Duration::ZERO,
        }
    }

    /// Time after activation at which the effect is forced off.
    fn lifetime(&self) -> Option<Duration> {
        match self {
            EffectSpec::Kamikadze(config) => Some(config.safety_window()),
            EffectSpec::Mine { config, .. } => Some(config.lifetime()),
            EffectSpec::BackhitDefence { .. } => None,
            EffectSpec::Emp(config) => Some(config.duration()),
            EffectSpec::Boost { duration } => Some(*duration),
        }
    }

    /// Whether the lifetime is a hard bound that nothing may extend.
    fn has_safety_bound(&self) -> bool {
        matches!(self, EffectSpec::Kamikadze(_))
    }

    fn advertised_duration(&self) -> Option<Duration> {
        match self {
            EffectSpec::Kamikadze(config) => Some(config.duration()),
            other => other.lifetime(),
        }
    }

    fn splash(&self) -> Option<&SplashProfile> {
        match self {
            EffectSpec::Kamikadze(config) => Some(&config.splash),
            EffectSpec::Mine { config, .. } => Some(&config.splash),
            _ => None,
        }
    }

    fn detail(&self) -> EffectDetail {
        match self {
            EffectSpec::Kamikadze(config) => EffectDetail::Splash(config.splash.clone()),
            EffectSpec::Mine {
                config, position, ..
            } => EffectDetail::Mine {
                position: *position,
                triggering_area: config.triggering_area,
                begin_hide_distance: config.begin_hide_distance,
                hide_range: config.hide_range,
                splash: config.splash.clone(),
            },
            EffectSpec::BackhitDefence { multiplier } => EffectDetail::BackhitDefence {
                multiplier: *multiplier,
            },
            EffectSpec::Emp(config) => EffectDetail::Emp {
                radius: config.radius,
            },
            EffectSpec::Boost { .. } => EffectDetail::Plain,
        }
    }
}

struct EffectSlot {
    machine: TimedStateMachine<Effect>,
    handle: Option<Handle>,
    pending_deactivation: bool,
    expiry: u64,
    expires_at: Option<Instant>,
    splash: Option<SplashHandler>,
    mine: Option<Arc<Mine>>,
}

/// A combat effect bound to one actor.
pub struct Effect {
    kind: EffectKind,
    owner: ActorTag,
    actor: Weak<BattleActor>,
    spec: EffectSpec,
    ctx: Arc<BattleContext>,
    this: Weak<Effect>,
    slot: Mutex<EffectSlot>,
}

impl Effect {
    fn new(
        kind: EffectKind,
        actor: &Arc<BattleActor>,
        ctx: Arc<BattleContext>,
        spec: EffectSpec,
    ) -> Arc<Self> {
        let scheduler = ctx.scheduler.clone();
        Arc::new_cyclic(|this| Self {
            kind,
            owner: actor.tag(),
            actor: Arc::downgrade(actor),
            spec,
            ctx,
            this: this.clone(),
            slot: Mutex::new(EffectSlot {
                machine: TimedStateMachine::new(scheduler, this.clone()),
                handle: None,
                pending_deactivation: false,
                expiry: 0,
                expires_at: None,
                splash: None,
                mine: None,
            }),
        })
    }

    pub fn kamikadze(actor: &Arc<BattleActor>, ctx: Arc<BattleContext>) -> Arc<Self> {
        let spec = EffectSpec::Kamikadze(ctx.config.kamikadze.clone());
        Self::new(EffectKind::Kamikadze, actor, ctx, spec)
    }

    /// A mine dropped at the actor's current position with the actor's next index.
    pub fn mine(actor: &Arc<BattleActor>, ctx: Arc<BattleContext>) -> Arc<Self> {
        let spec = EffectSpec::Mine {
            config: ctx.config.mine.clone(),
            position: actor.position(),
            index: actor.next_mine_index(),
        };
        Self::new(EffectKind::Mine, actor, ctx, spec)
    }

    pub fn backhit_defence(
        actor: &Arc<BattleActor>,
        ctx: Arc<BattleContext>,
        multiplier: f32,
    ) -> Arc<Self> {
        let spec = EffectSpec::BackhitDefence { multiplier };
        Self::new(EffectKind::BackhitDefence, actor, ctx, spec)
    }

    pub fn emp(actor: &Arc<BattleActor>, ctx: Arc<BattleContext>) -> Arc<Self> {
        let spec = EffectSpec::Emp(ctx.config.emp.clone());
        Self::new(EffectKind::Emp, actor, ctx, spec)
    }

    /// Timed stat boost. Returns `None` unless `kind` is one of the boost kinds.
    pub fn boost(
        actor: &Arc<BattleActor>,
        ctx: Arc<BattleContext>,
        kind: EffectKind,
        duration: Duration,
    ) -> Option<Arc<Self>> {
        match kind {
            EffectKind::ArmorBoost | EffectKind::DamageBoost | EffectKind::SpeedBoost => Some(
                Self::new(kind, actor, ctx, EffectSpec::Boost { duration }),
            ),
            _ => None,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn owner(&self) -> ActorTag {
        self.owner
    }

    pub fn spec(&self) -> &EffectSpec {
        &self.spec
    }

    pub async fn state(&self) -> TimedState {
        self.slot.lock().await.machine.state()
    }

    pub async fn is_active(&self) -> bool {
        !self.state().await.is_idle()
    }

    /// `false` while inactive or inside the grace window.
    pub async fn can_be_deactivated(&self) -> bool {
        self.state().await.is_active()
    }

    pub async fn is_deactivation_pending(&self) -> bool {
        self.slot.lock().await.pending_deactivation
    }

    pub async fn handle(&self) -> Option<Handle> {
        self.slot.lock().await.handle
    }

    /// Time left before the scheduled expiry, if one is pending.
    pub async fn remaining(&self) -> Option<Duration> {
        self.slot
            .lock()
            .await
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Activates the effect.
    ///
    /// Returns `false` if it is already active, its owner is gone, or the
    /// owner's collection rejects it because an exclusive effect of the same
    /// kind is live.
    pub async fn activate(self: &Arc<Self>) -> bool {
        let mut slot = self.slot.lock().await;
        if !slot.machine.state().is_idle() {
            return false;
        }
        let Some(actor) = self.actor.upgrade() else {
            return false;
        };
        if !actor.effects().try_insert(self) {
            debug!(
                target: "battle::effect",
                owner = %self.owner.id,
                kind = %self.kind,
                "activation rejected by exclusivity"
            );
            return false;
        }

        let handle = self
            .ctx
            .builder
            .build(Representation::Effect(self.descriptor()))
            .await;
        slot.handle = Some(handle);
        slot.pending_deactivation = false;
        slot.splash = self.spec.splash().cloned().map(SplashHandler::new);

        if let EffectSpec::Mine {
            config,
            position,
            index,
        } = &self.spec
        {
            let link = MineLink::new(
                self.this.clone(),
                self.owner,
                *position,
                config.triggering_area,
                *index,
                self.ctx.scheduler.clone(),
            );
            let mine = Arc::new(Mine::new(Arc::new(link)));
            if self.ctx.minefield.insert(Arc::clone(&mine)) {
                self.ctx.publish(MineEvent::Armed {
                    owner: self.owner.id,
                    index: *index,
                    position: *position,
                });
            }
            slot.mine = Some(mine);
        }

        let grace = self.spec.grace_window();
        if grace.is_zero() {
            slot.machine.set_state(TimedState::Active);
        } else {
            slot.machine.set_state(TimedState::Cooldown(grace));
        }

        self.share_to_audience(handle).await;

        if let Some(lifetime) = self.spec.lifetime() {
            self.schedule_expiry(&mut slot, lifetime);
        }

        info!(
            target: "battle::effect",
            owner = %self.owner.id,
            kind = %self.kind,
            handle = %handle,
            "effect activated"
        );
        self.ctx.publish(EffectEvent::Activated {
            owner: self.owner.id,
            kind: self.kind,
            handle,
        });
        true
    }

    /// Requests deactivation.
    ///
    /// Returns `true` if the effect went inactive now. A request arriving
    /// during the grace window returns `false` and is honoured when the window
    /// ends.
    pub async fn deactivate(&self) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.machine.state() {
            TimedState::Idle => false,
            TimedState::Cooldown(_) => {
                if !slot.pending_deactivation {
                    slot.pending_deactivation = true;
                    debug!(
                        target: "battle::effect",
                        owner = %self.owner.id,
                        kind = %self.kind,
                        "deactivation deferred until grace window ends"
                    );
                    self.ctx.publish(EffectEvent::DeactivationDeferred {
                        owner: self.owner.id,
                        kind: self.kind,
                    });
                }
                false
            }
            TimedState::Active => {
                self.finish(&mut slot).await;
                true
            }
        }
    }

    /// Forced deactivation by an EMP strike. Ignores the grace window.
    pub async fn deactivate_by_emp(&self) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.machine.state().is_idle() {
            return false;
        }
        self.finish(&mut slot).await;
        true
    }

    /// Restarts the expiry countdown with `duration`.
    ///
    /// Only effects with a lifetime can be prolonged. A kamikadze keeps its
    /// safety bound whatever duration is granted.
    pub async fn prolong(&self, duration: Duration) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.machine.state().is_idle()
            || self.spec.lifetime().is_none()
            || self.spec.has_safety_bound()
        {
            return false;
        }
        self.schedule_expiry(&mut slot, duration);
        self.ctx.publish(EffectEvent::Prolonged {
            owner: self.owner.id,
            kind: self.kind,
            remaining: duration,
        });
        true
    }

    /// Sends the splash to the impact sink.
    ///
    /// Kamikadze detonates at the owner's position and stays active; a mine
    /// detonates at its own position and is consumed.
    pub async fn detonate(&self) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.machine.state().is_idle() {
            return false;
        }
        let Some(splash) = slot.splash.clone() else {
            return false;
        };
        let center = match &self.spec {
            EffectSpec::Mine { position, .. } => *position,
            _ => match self.actor.upgrade() {
                Some(actor) => actor.position(),
                None => return false,
            },
        };

        splash
            .detonate(self.owner.id, center, self.ctx.impacts.as_ref())
            .await;
        info!(
            target: "battle::effect",
            owner = %self.owner.id,
            kind = %self.kind,
            x = center.x,
            y = center.y,
            z = center.z,
            "detonated"
        );
        self.ctx.publish(EffectEvent::Detonated {
            owner: self.owner.id,
            kind: self.kind,
            center,
        });

        if self.kind == EffectKind::Mine {
            self.finish(&mut slot).await;
        }
        true
    }

    /// Strips every EMP-sensitive effect from `targets`.
    ///
    /// No-op unless this is an active EMP. Returns how many effects were
    /// deactivated.
    pub async fn apply(&self, targets: &[Arc<BattleActor>]) -> usize {
        if self.kind != EffectKind::Emp || !self.is_active().await {
            return 0;
        }

        let mut stripped = 0;
        for target in targets {
            for effect in target.effects().snapshot() {
                if effect.kind().is_emp_sensitive() && effect.deactivate_by_emp().await {
                    stripped += 1;
                }
            }
        }

        info!(
            target: "battle::effect",
            owner = %self.owner.id,
            targets = targets.len(),
            stripped,
            "emp applied"
        );
        self.ctx.publish(EffectEvent::EmpApplied {
            owner: self.owner.id,
            targets: targets.iter().map(|t| t.id()).collect(),
            stripped,
        });
        stripped
    }

    /// Shares the representation with `observer` if it may see this effect.
    pub async fn share(&self, observer: &Observer) -> bool {
        let slot = self.slot.lock().await;
        match slot.handle {
            Some(handle) if self.is_visible_to(observer) => observer.share(&[handle]).await > 0,
            _ => false,
        }
    }

    pub async fn unshare(&self, observer: &Observer) -> bool {
        let slot = self.slot.lock().await;
        match slot.handle {
            Some(handle) => observer.unshare(&[handle]).await > 0,
            None => false,
        }
    }

    fn is_visible_to(&self, observer: &Observer) -> bool {
        !self.kind.is_owner_only() || observer.actor() == Some(self.owner.id)
    }

    async fn share_to_audience(&self, handle: Handle) {
        if self.kind.is_owner_only() {
            for observer in self.ctx.observers.controlling(self.owner.id) {
                observer.share(&[handle]).await;
            }
        } else {
            self.ctx.observers.share_all(&[handle]).await;
        }
    }

    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor {
            owner: self.owner.id,
            kind: self.kind,
            duration: self.spec.advertised_duration(),
            detail: self.spec.detail(),
        }
    }

    fn schedule_expiry(&self, slot: &mut EffectSlot, after: Duration) {
        slot.expiry = slot.expiry.wrapping_add(1);
        slot.expires_at = Some(deadline_after(after));

        let expiry = slot.expiry;
        let this = self.this.clone();
        self.ctx.scheduler.schedule(after, async move {
            if let Some(effect) = this.upgrade() {
                effect.expire(expiry).await;
            }
        });
    }

    async fn expire(&self, expiry: u64) {
        let mut slot = self.slot.lock().await;
        if slot.expiry != expiry || slot.machine.state().is_idle() {
            return;
        }
        debug!(
            target: "battle::effect",
            owner = %self.owner.id,
            kind = %self.kind,
            "effect expired"
        );
        self.finish(&mut slot).await;
    }

    /// Deactivation path shared by every trigger. The caller holds the slot lock.
    async fn finish(&self, slot: &mut EffectSlot) {
        slot.machine.set_state(TimedState::Idle);
        slot.expiry = slot.expiry.wrapping_add(1);
        slot.expires_at = None;
        slot.pending_deactivation = false;
        slot.splash = None;

        if let Some(mine) = slot.mine.take() {
            let key = mine.key();
            if self.ctx.minefield.remove(key).is_some() {
                self.ctx.publish(MineEvent::Cleared {
                    owner: key.owner,
                    index: key.index,
                });
            }
        }

        if let Some(actor) = self.actor.upgrade() {
            actor.effects().remove(self);
        }

        if let Some(handle) = slot.handle.take() {
            self.ctx.observers.unshare_all(&[handle]).await;
        }

        info!(
            target: "battle::effect",
            owner = %self.owner.id,
            kind = %self.kind,
            "effect deactivated"
        );
        self.ctx.publish(EffectEvent::Deactivated {
            owner: self.owner.id,
            kind: self.kind,
        });
    }
}

#[async_trait]
impl CooldownTarget for Effect {
    /// End of the grace window.
    async fn cooldown_elapsed(self: Arc<Self>, generation: Generation) {
        let mut slot = self.slot.lock().await;
        if !slot.machine.is_current(generation) {
            return;
        }
        slot.machine.set_state(TimedState::Active);

        if slot.pending_deactivation {
            debug!(
                target: "battle::effect",
                owner = %self.owner.id,
                kind = %self.kind,
                "replaying deferred deactivation"
            );
            self.finish(&mut slot).await;
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("kind", &self.kind)
            .field("owner", &self.owner)
            .field("spec", &self.spec)
            .finish()
    }
}
