//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use super::types::{EffectEvent, MineEvent, PickupEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Pickup exposure, spawns and collection
    Pickup,
    /// Combat effect activation and teardown
    Effect,
    /// Mine triggers
    Mine,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Pickup(PickupEvent),
    Effect(EffectEvent),
    Mine(MineEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Pickup(_) => Topic::Pickup,
            Event::Effect(_) => Topic::Effect,
            Event::Mine(_) => Topic::Mine,
        }
    }
}

impl From<PickupEvent> for Event {
    fn from(event: PickupEvent) -> Self {
        Event::Pickup(event)
    }
}

impl From<EffectEvent> for Event {
    fn from(event: EffectEvent) -> Self {
        Event::Effect(event)
    }
}

impl From<MineEvent> for Event {
    fn from(event: MineEvent) -> Self {
        Event::Mine(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Topics are fixed, so each gets its own channel
/// and no lock is needed to route an event.
#[derive(Clone)]
pub struct EventBus {
    pickup: broadcast::Sender<Event>,
    effect: broadcast::Sender<Event>,
    mine: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pickup: broadcast::channel(capacity).0,
            effect: broadcast::channel(capacity).0,
            mine: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Pickup => &self.pickup,
            Topic::Effect => &self.effect,
            Topic::Mine => &self.mine,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
