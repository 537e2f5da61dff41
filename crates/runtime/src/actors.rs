//! Battle participants as seen by the lifecycle engine.
//!
//! The authoritative world model lives elsewhere. It keeps [`BattleActor`]
//! positions and liveness up to date and answers [`ActorQuery`] lookups; the
//! engine only reads them and maintains each actor's effect collection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use battle_core::{ActorId, ActorTag, Position, TeamId};

use crate::effects::EffectCollection;

pub struct BattleActor {
    tag: ActorTag,
    position: RwLock<Position>,
    alive: AtomicBool,
    effects: EffectCollection,
    mine_sequence: AtomicU32,
}

impl BattleActor {
    pub fn new(id: ActorId, team: Option<TeamId>, position: Position) -> Self {
        Self {
            tag: ActorTag::new(id, team),
            position: RwLock::new(position),
            alive: AtomicBool::new(true),
            effects: EffectCollection::new(),
            mine_sequence: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> ActorId {
        self.tag.id
    }

    pub fn tag(&self) -> ActorTag {
        self.tag
    }

    pub fn position(&self) -> Position {
        *self
            .position
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_position(&self, position: Position) {
        *self
            .position
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = position;
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    pub fn is_enemy(&self, other: &ActorTag) -> bool {
        self.tag.is_enemy(other)
    }

    pub fn effects(&self) -> &EffectCollection {
        &self.effects
    }

    /// Next per-actor mine index. Never reused within a battle.
    pub fn next_mine_index(&self) -> u32 {
        self.mine_sequence.fetch_add(1, Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BattleActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleActor")
            .field("tag", &self.tag)
            .field("position", &self.position())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Read access to the actors of a battle.
pub trait ActorQuery: Send + Sync {
    /// Actors currently alive in the battle.
    fn live_actors(&self) -> Vec<Arc<BattleActor>>;

    /// Every actor, dead ones included. Effects a dead actor left behind,
    /// such as deployed mines, stay in the world and are reached through here.
    fn all_actors(&self) -> Vec<Arc<BattleActor>>;

    /// Looks up an actor whether or not it is alive.
    fn find(&self, id: ActorId) -> Option<Arc<BattleActor>>;
}

/// In-memory actor table.
#[derive(Default)]
pub struct Roster {
    actors: RwLock<BTreeMap<ActorId, Arc<BattleActor>>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor, replacing any previous actor with the same id.
    pub fn insert(&self, actor: BattleActor) -> Arc<BattleActor> {
        let actor = Arc::new(actor);
        self.actors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(actor.id(), Arc::clone(&actor));
        actor
    }

    pub fn remove(&self, id: ActorId) -> Option<Arc<BattleActor>> {
        self.actors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id)
    }

    pub fn len(&self) -> usize {
        self.actors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActorQuery for Roster {
    fn live_actors(&self) -> Vec<Arc<BattleActor>> {
        self.actors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|actor| actor.is_alive())
            .cloned()
            .collect()
    }

    fn all_actors(&self) -> Vec<Arc<BattleActor>> {
        self.actors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect()
    }

    fn find(&self, id: ActorId) -> Option<Arc<BattleActor>> {
        self.actors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
    }
}
