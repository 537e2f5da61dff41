//! Binding between a [`Mine`](battle_core::Mine) and the effect that deployed it.

use std::sync::Weak;

use battle_core::{ActorTag, MineBinding, Position};

use super::Effect;
use crate::scheduler::Scheduler;

pub(crate) struct MineLink {
    effect: Weak<Effect>,
    owner: ActorTag,
    position: Position,
    triggering_area: f32,
    index: u32,
    scheduler: Scheduler,
}

impl MineLink {
    pub(crate) fn new(
        effect: Weak<Effect>,
        owner: ActorTag,
        position: Position,
        triggering_area: f32,
        index: u32,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            effect,
            owner,
            position,
            triggering_area,
            index,
            scheduler,
        }
    }
}

impl MineBinding for MineLink {
    fn owner(&self) -> ActorTag {
        self.owner
    }

    fn position(&self) -> Position {
        self.position
    }

    fn triggering_area(&self) -> f32 {
        self.triggering_area
    }

    fn index(&self) -> u32 {
        self.index
    }

    // Detonation awaits the impact sink and the observers, so it runs as its
    // own task instead of inside the minefield pass.
    fn explode(&self) {
        if let Some(effect) = self.effect.upgrade() {
            self.scheduler.spawn(async move {
                effect.detonate().await;
            });
        }
    }
}
