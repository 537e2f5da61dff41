//! Battle-wide pickup orchestration.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::time::Instant;
use tracing::{debug, info};

use battle_core::{ActorId, Handle, PickupKind, PlacementTable, SetupError};

use super::pickup::Pickup;
use super::policy::GoldDropPolicy;
use crate::actors::ActorQuery;
use crate::api::PickupRewards;
use crate::context::BattleContext;
use crate::events::MineEvent;
use crate::visibility::Observer;

/// Owns every pickup of a battle.
///
/// The arena is built once, in shuffled order, and never changes shape, so it
/// needs no collection-wide lock. Each pickup serializes its own transitions.
pub struct PickupLifecycleManager {
    ctx: Arc<BattleContext>,
    actors: Arc<dyn ActorQuery>,
    rewards: Arc<dyn PickupRewards>,
    pickups: Vec<Arc<Pickup>>,
    rng: Mutex<ChaCha8Rng>,
    gold_policy: Arc<dyn GoldDropPolicy>,
    golds_dropped: AtomicU32,
    last_gold_drop: tokio::sync::Mutex<Option<Instant>>,
}

impl PickupLifecycleManager {
    /// Builds the arena from static placements.
    ///
    /// Fails if any placement is malformed. The arena order is shuffled with
    /// the configured seed, or from entropy when no seed is set.
    pub fn new(
        ctx: Arc<BattleContext>,
        actors: Arc<dyn ActorQuery>,
        rewards: Arc<dyn PickupRewards>,
        placements: &PlacementTable,
        gold_policy: Arc<dyn GoldDropPolicy>,
    ) -> Result<Self, SetupError> {
        placements.validate()?;

        let mut rng = match ctx.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut entries: Vec<_> = placements
            .iter()
            .map(|(kind, placement)| (kind, *placement))
            .collect();
        entries.shuffle(&mut rng);

        let pickups = entries
            .into_iter()
            .enumerate()
            .map(|(index, (kind, placement))| {
                Pickup::new(index, kind, placement, Arc::clone(&ctx))
            })
            .collect::<Vec<_>>();

        debug!(target: "battle::pickup", count = pickups.len(), "pickup arena built");

        Ok(Self {
            ctx,
            actors,
            rewards,
            pickups,
            rng: Mutex::new(rng),
            gold_policy,
            golds_dropped: AtomicU32::new(0),
            last_gold_drop: tokio::sync::Mutex::new(None),
        })
    }

    pub fn pickups(&self) -> &[Arc<Pickup>] {
        &self.pickups
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Pickup>> {
        self.pickups.get(index)
    }

    /// Successful gold drops so far.
    pub fn golds_dropped(&self) -> u32 {
        self.golds_dropped.load(Ordering::Acquire)
    }

    /// Exposes supply regions and starts each supply pickup's first cooldown
    /// with a uniformly random delay below the configured bound.
    pub async fn initialize(&self) {
        let bound = self.ctx.config.pickups.initial_delay_max_ms;
        for pickup in self.pickups.iter().filter(|p| p.kind().is_supply()) {
            let delay = if bound == 0 {
                Duration::ZERO
            } else {
                Duration::from_millis(self.rng().gen_range(0..bound))
            };
            pickup.initialize(delay).await;
        }
        info!(target: "battle::pickup", count = self.pickups.len(), "pickups initialized");
    }

    /// Promotes due cooldowns, then runs the minefield against live actors.
    pub async fn tick(&self) {
        let now = Instant::now();
        for pickup in &self.pickups {
            pickup.advance(now).await;
        }

        let actors = self.actors.live_actors();
        for (key, by) in self.ctx.minefield.evaluate(&actors) {
            debug!(
                target: "battle::mine",
                owner = %key.owner,
                index = key.index,
                by = %by,
                "mine triggered"
            );
            self.ctx.publish(MineEvent::Triggered {
                owner: key.owner,
                index: key.index,
                by,
            });
        }
    }

    /// Collects `pickup` for `actor`. `false` if the actor is unknown or dead,
    /// or the pickup is not present.
    pub async fn take(&self, pickup: &Pickup, actor: ActorId) -> bool {
        let Some(actor) = self.actors.find(actor).filter(|a| a.is_alive()) else {
            debug!(target: "battle::pickup", actor = %actor, "take ignored, actor not live");
            return false;
        };
        pickup.take(&actor, self.rewards.as_ref()).await
    }

    /// Shares every pickup `observer` should see, one pickup at a time.
    pub async fn share_to(&self, observer: &Observer) {
        for pickup in &self.pickups {
            pickup.share_to(observer).await;
        }
    }

    pub async fn unshare_to(&self, observer: &Observer) {
        for pickup in &self.pickups {
            pickup.unshare_to(observer).await;
        }
    }

    /// Pickup whose box entity is `handle`.
    pub async fn find_by_handle(&self, handle: Handle) -> Option<Arc<Pickup>> {
        for pickup in &self.pickups {
            if pickup.entity().await == Some(handle) {
                return Some(Arc::clone(pickup));
            }
        }
        None
    }

    /// Spawns one random non-present pickup of `kind` right away.
    ///
    /// Gold drops must also pass the drop policy and are counted. Returns
    /// whether a pickup was dropped.
    pub async fn force_drop(&self, kind: PickupKind, requester: ActorId) -> bool {
        let mut last_gold = match kind {
            PickupKind::Gold => Some(self.last_gold_drop.lock().await),
            _ => None,
        };
        let now = Instant::now();

        if let Some(last) = last_gold.as_deref()
            && !self.gold_policy.allows(self.golds_dropped(), *last, now)
        {
            debug!(
                target: "battle::pickup",
                requester = %requester,
                dropped = self.golds_dropped(),
                "gold drop blocked by policy"
            );
            return false;
        }

        let mut candidates: Vec<_> = self
            .pickups
            .iter()
            .filter(|p| p.kind() == kind)
            .cloned()
            .collect();
        candidates.shuffle(&mut *self.rng());

        for pickup in candidates {
            if !pickup.force_drop().await {
                continue;
            }
            if let Some(last) = last_gold.as_deref_mut() {
                *last = Some(now);
                self.golds_dropped.fetch_add(1, Ordering::AcqRel);
            }
            info!(
                target: "battle::pickup",
                index = pickup.index(),
                kind = %kind,
                requester = %requester,
                "pickup force dropped"
            );
            return true;
        }

        debug!(target: "battle::pickup", kind = %kind, "no droppable pickup");
        false
    }

    fn rng(&self) -> MutexGuard<'_, ChaCha8Rng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
