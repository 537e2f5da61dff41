//! Services shared by every object of one battle.

use std::sync::Arc;

use battle_core::BattleConfig;

use crate::api::{ImpactSink, RepresentationBuilder};
use crate::events::{Event, EventBus};
use crate::minefield::Minefield;
use crate::scheduler::Scheduler;
use crate::visibility::ObserverRegistry;

/// Per-battle collaborators and registries.
///
/// Pickups and effects keep an `Arc` to this context. It deliberately holds no
/// actors, so effects stored in an actor's collection never form a cycle
/// through it.
pub struct BattleContext {
    pub(crate) config: BattleConfig,
    pub(crate) scheduler: Scheduler,
    pub(crate) builder: Arc<dyn RepresentationBuilder>,
    pub(crate) impacts: Arc<dyn ImpactSink>,
    pub(crate) observers: ObserverRegistry,
    pub(crate) minefield: Minefield,
    pub(crate) events: EventBus,
}

impl BattleContext {
    pub fn new(
        config: BattleConfig,
        scheduler: Scheduler,
        builder: Arc<dyn RepresentationBuilder>,
        impacts: Arc<dyn ImpactSink>,
    ) -> Self {
        let events = EventBus::with_capacity(config.event_buffer_size);
        Self {
            config,
            scheduler,
            builder,
            impacts,
            observers: ObserverRegistry::new(),
            minefield: Minefield::new(),
            events,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub(crate) fn publish(&self, event: impl Into<Event>) {
        self.events.publish(event.into());
    }
}
