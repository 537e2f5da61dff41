//! Deployed mines and their proximity trigger.
//!
//! A [`Mine`] is identified solely by its owner and per-owner sequence index.
//! Everything else (position, trigger radius, what happens on detonation) is
//! delegated to the [`MineBinding`] supplied by the effect that deployed it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use crate::state::{ActorId, ActorTag, Position};

/// Attributes a mine reads from the effect that deployed it.
pub trait MineBinding: Send + Sync {
    fn owner(&self) -> ActorTag;

    fn position(&self) -> Position;

    fn triggering_area(&self) -> f32;

    /// Per-owner sequence number, unique among the owner's mines.
    fn index(&self) -> u32;

    /// Runs the explosion path. Invoked at most once per mine and must not block.
    fn explode(&self);
}

/// Identity of a mine: owner first, then sequence index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MineKey {
    pub owner: ActorId,
    pub index: u32,
}

/// A deployed hazard that detonates once when a hostile actor comes close.
pub struct Mine {
    binding: Arc<dyn MineBinding>,
    triggered: AtomicBool,
}

impl Mine {
    pub fn new(binding: Arc<dyn MineBinding>) -> Self {
        Self {
            binding,
            triggered: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> MineKey {
        MineKey {
            owner: self.binding.owner().id,
            index: self.binding.index(),
        }
    }

    pub fn owner(&self) -> ActorTag {
        self.binding.owner()
    }

    pub fn position(&self) -> Position {
        self.binding.position()
    }

    pub fn triggering_area(&self) -> f32 {
        self.binding.triggering_area()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(AtomicOrdering::Acquire)
    }

    /// Tests `actor` at `position` against this mine.
    ///
    /// Returns `false` without side effects if the mine already fired, the
    /// actor is not hostile to the owner, or the actor is outside the trigger
    /// radius. Otherwise marks the mine triggered and runs the explosion path.
    /// Single-fire: concurrent callers race on the flag and exactly one wins.
    pub fn try_trigger(&self, actor: &ActorTag, position: Position) -> bool {
        if self.is_triggered()
            || !actor.is_enemy(&self.binding.owner())
            || position.distance(&self.binding.position()) > self.binding.triggering_area()
        {
            return false;
        }

        if self
            .triggered
            .compare_exchange(false, true, AtomicOrdering::AcqRel, AtomicOrdering::Acquire)
            .is_err()
        {
            return false;
        }

        self.binding.explode();
        true
    }
}

impl PartialEq for Mine {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Mine {}

impl PartialOrd for Mine {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mine {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Mine {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Mine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mine")
            .field("key", &self.key())
            .field("position", &self.position())
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
