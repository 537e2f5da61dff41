//! High-level battle orchestrator.
//!
//! [`Battle`] composes the collaborators supplied by the embedder with the
//! pickup manager, the minefield, passive modules and the event bus. The
//! embedder either calls [`Battle::tick`] from its own loop or lets
//! [`Battle::spawn`] drive ticks on an interval.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use battle_core::{
    ActorId, BattleConfig, EffectKind, Handle, ObserverId, PickupKind, PlacementTable,
};

use crate::actors::{ActorQuery, BattleActor};
use crate::api::{
    BattleError, ImpactSink, ObserverConnection, PickupRewards, RepresentationBuilder, Result,
};
use crate::context::BattleContext;
use crate::effects::Effect;
use crate::events::{Event, EventBus, Topic};
use crate::minefield::Minefield;
use crate::modules::{AlwaysActiveModule, BackhitDefenceModule};
use crate::pickups::{CappedIntervalPolicy, GoldDropPolicy, PickupLifecycleManager};
use crate::scheduler::Scheduler;
use crate::visibility::{Observer, ObserverRegistry};

/// One running battle.
pub struct Battle {
    ctx: Arc<BattleContext>,
    actors: Arc<dyn ActorQuery>,
    pickups: PickupLifecycleManager,
    modules: Mutex<Vec<Arc<dyn AlwaysActiveModule>>>,
}

impl Battle {
    /// Create a new battle builder
    pub fn builder() -> BattleBuilder {
        BattleBuilder::new()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.ctx.config
    }

    pub fn context(&self) -> &Arc<BattleContext> {
        &self.ctx
    }

    pub fn pickups(&self) -> &PickupLifecycleManager {
        &self.pickups
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.ctx.observers
    }

    pub fn minefield(&self) -> &Minefield {
        &self.ctx.minefield
    }

    pub fn events(&self) -> &EventBus {
        &self.ctx.events
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.ctx.events.subscribe(topic)
    }

    /// Starts the pickup cycle.
    pub async fn start(&self) {
        self.pickups.initialize().await;
        info!(target: "battle", "battle started");
    }

    /// One simulation step: pickups and mines, then passive modules.
    pub async fn tick(&self) {
        self.pickups.tick().await;
        for module in self.modules_snapshot() {
            module.activate().await;
        }
    }

    /// Registers an observer and brings its view up to date.
    ///
    /// The observer is registered before the catch-up pass, so objects that
    /// appear concurrently reach it either way. A previous observer with the
    /// same id is replaced.
    pub async fn connect(
        &self,
        id: ObserverId,
        actor: Option<ActorId>,
        connection: Arc<dyn ObserverConnection>,
    ) -> Arc<Observer> {
        let observer = Arc::new(Observer::new(id, actor, connection));
        if self.ctx.observers.insert(Arc::clone(&observer)).is_some() {
            debug!(target: "battle", observer = %id, "observer replaced");
        }

        self.pickups.share_to(&observer).await;
        for effect in self.effects_in_play() {
            effect.share(&observer).await;
        }

        info!(target: "battle", observer = %id, "observer connected");
        observer
    }

    /// Unregisters an observer and revokes everything it could see.
    pub async fn disconnect(&self, id: ObserverId) -> bool {
        let Some(observer) = self.ctx.observers.remove(id) else {
            return false;
        };

        self.pickups.unshare_to(&observer).await;
        for effect in self.effects_in_play() {
            effect.unshare(&observer).await;
        }

        info!(target: "battle", observer = %id, "observer disconnected");
        true
    }

    /// Resolves a client's click on a pickup box and collects it.
    pub async fn take(&self, entity: Handle, actor: ActorId) -> bool {
        match self.pickups.find_by_handle(entity).await {
            Some(pickup) => self.pickups.take(&pickup, actor).await,
            None => {
                debug!(target: "battle", entity = %entity, "take for unknown pickup dropped");
                false
            }
        }
    }

    pub async fn force_drop(&self, kind: PickupKind, requester: ActorId) -> bool {
        self.pickups.force_drop(kind, requester).await
    }

    /// Creates an inactive effect of `kind` for a live actor.
    ///
    /// Parameters come from the battle configuration. Call
    /// [`Effect::activate`] on the result to put it into play.
    pub fn create_effect(&self, actor: ActorId, kind: EffectKind) -> Option<Arc<Effect>> {
        let actor = self.live_actor(actor)?;
        let ctx = Arc::clone(&self.ctx);
        match kind {
            EffectKind::Kamikadze => Some(Effect::kamikadze(&actor, ctx)),
            EffectKind::Mine => Some(Effect::mine(&actor, ctx)),
            EffectKind::BackhitDefence => {
                let multiplier = ctx.config.backhit_defence.multiplier;
                Some(Effect::backhit_defence(&actor, ctx, multiplier))
            }
            EffectKind::Emp => Some(Effect::emp(&actor, ctx)),
            EffectKind::ArmorBoost | EffectKind::DamageBoost | EffectKind::SpeedBoost => {
                let duration = ctx.config.pickups.boost_duration();
                Effect::boost(&actor, ctx, kind, duration)
            }
        }
    }

    /// Creates and activates an effect. `None` if the actor is not live or
    /// activation was rejected.
    pub async fn activate_effect(&self, actor: ActorId, kind: EffectKind) -> Option<Arc<Effect>> {
        let effect = self.create_effect(actor, kind)?;
        if effect.activate().await {
            Some(effect)
        } else {
            None
        }
    }

    /// Installs a passive module and asserts it immediately.
    pub async fn install_module(&self, module: Arc<dyn AlwaysActiveModule>) {
        self.modules
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::clone(&module));
        module.activate().await;
    }

    /// Builds the back-hit defence module for a live actor.
    pub fn backhit_defence_module(&self, actor: ActorId) -> Option<Arc<BackhitDefenceModule>> {
        let actor = self.live_actor(actor)?;
        Some(Arc::new(BackhitDefenceModule::new(actor, Arc::clone(&self.ctx))))
    }

    /// Dispatches a client's EMP target list.
    ///
    /// The request is dropped when `actor` has no active EMP effect with
    /// handle `emp`; otherwise the ids are resolved to live actors and the
    /// effect is applied once. Returns whether the request was dispatched.
    pub async fn apply_emp_targets(
        &self,
        actor: ActorId,
        emp: Handle,
        targets: &[ActorId],
    ) -> bool {
        let Some(source) = self.actors.find(actor) else {
            debug!(target: "battle", actor = %actor, "emp targets from unknown actor dropped");
            return false;
        };

        let mut effect = None;
        for candidate in source.effects().snapshot() {
            if candidate.kind() == EffectKind::Emp && candidate.handle().await == Some(emp) {
                effect = Some(candidate);
                break;
            }
        }
        let Some(effect) = effect else {
            debug!(target: "battle", actor = %actor, emp = %emp, "stale emp targets dropped");
            return false;
        };

        let wanted: HashSet<_> = targets.iter().copied().collect();
        let resolved: Vec<_> = self
            .actors
            .live_actors()
            .into_iter()
            .filter(|candidate| wanted.contains(&candidate.id()))
            .collect();

        effect.apply(&resolved).await;
        true
    }

    /// Drives ticks on the configured period until `shutdown` resolves.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        let mut interval = tokio::time::interval(self.ctx.config.tick_period());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => self.tick().await,
            }
        }
        info!(target: "battle", "battle loop stopped");
    }

    /// Runs the tick loop as a background task.
    pub fn spawn(self: Arc<Self>) -> BattleLoop {
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            self.run_until(async {
                let _ = stopped.await;
            })
            .await;
        });
        BattleLoop { stop, task }
    }

    fn live_actor(&self, id: ActorId) -> Option<Arc<BattleActor>> {
        self.actors.find(id).filter(|actor| actor.is_alive())
    }

    /// Effects still in the world, including those of dead actors.
    fn effects_in_play(&self) -> Vec<Arc<Effect>> {
        self.actors
            .all_actors()
            .iter()
            .flat_map(|actor| actor.effects().snapshot())
            .collect()
    }

    fn modules_snapshot(&self) -> Vec<Arc<dyn AlwaysActiveModule>> {
        self.modules
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Handle to a battle loop started with [`Battle::spawn`].
pub struct BattleLoop {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl BattleLoop {
    /// Stops the loop after the current tick and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.stop.send(());
        self.task.await.map_err(BattleError::LoopJoin)
    }
}

/// Builder for [`Battle`] with flexible configuration.
pub struct BattleBuilder {
    config: BattleConfig,
    placements: PlacementTable,
    builder: Option<Arc<dyn RepresentationBuilder>>,
    actors: Option<Arc<dyn ActorQuery>>,
    rewards: Option<Arc<dyn PickupRewards>>,
    impacts: Option<Arc<dyn ImpactSink>>,
    gold_policy: Option<Arc<dyn GoldDropPolicy>>,
}

impl BattleBuilder {
    fn new() -> Self {
        Self {
            config: BattleConfig::default(),
            placements: PlacementTable::new(),
            builder: None,
            actors: None,
            rewards: None,
            impacts: None,
            gold_policy: None,
        }
    }

    /// Override battle configuration
    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// Pickup placements for the map
    pub fn placements(mut self, placements: PlacementTable) -> Self {
        self.placements = placements;
        self
    }

    /// Set required representation builder
    pub fn representation_builder(mut self, builder: Arc<dyn RepresentationBuilder>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Set required actor source
    pub fn actors(mut self, actors: Arc<dyn ActorQuery>) -> Self {
        self.actors = Some(actors);
        self
    }

    /// Set required pickup reward handler
    pub fn rewards(mut self, rewards: Arc<dyn PickupRewards>) -> Self {
        self.rewards = Some(rewards);
        self
    }

    /// Set required impact sink
    pub fn impacts(mut self, impacts: Arc<dyn ImpactSink>) -> Self {
        self.impacts = Some(impacts);
        self
    }

    /// Replace the gold drop policy.
    ///
    /// Defaults to [`CappedIntervalPolicy`] built from the configuration.
    pub fn gold_policy(mut self, policy: Arc<dyn GoldDropPolicy>) -> Self {
        self.gold_policy = Some(policy);
        self
    }

    /// Validates the configuration and placements and assembles the battle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Battle> {
        self.config.validate()?;
        self.placements.validate()?;

        let builder = self
            .builder
            .ok_or(BattleError::MissingCollaborator("representation builder"))?;
        let actors = self
            .actors
            .ok_or(BattleError::MissingCollaborator("actor query"))?;
        let rewards = self
            .rewards
            .ok_or(BattleError::MissingCollaborator("pickup rewards"))?;
        let impacts = self
            .impacts
            .ok_or(BattleError::MissingCollaborator("impact sink"))?;

        let scheduler = Scheduler::current()?;
        let gold_policy: Arc<dyn GoldDropPolicy> = match self.gold_policy {
            Some(policy) => policy,
            None => Arc::new(CappedIntervalPolicy::from(&self.config.gold)),
        };

        let ctx = Arc::new(BattleContext::new(self.config, scheduler, builder, impacts));
        let pickups = PickupLifecycleManager::new(
            Arc::clone(&ctx),
            Arc::clone(&actors),
            rewards,
            &self.placements,
            gold_policy,
        )?;

        info!(
            target: "battle",
            pickups = pickups.pickups().len(),
            "battle assembled"
        );

        Ok(Battle {
            ctx,
            actors,
            pickups,
            modules: Mutex::new(Vec::new()),
        })
    }
}
