//! Lifecycle engine for transient battle objects.
//!
//! This crate keeps pickups, deployed mines and timed combat effects
//! consistent with what every connected observer sees while a battle advances
//! in ticks. Embedders supply the collaborators in [`api`] and drive a
//! [`Battle`] built with [`BattleBuilder`].
//!
//! Modules are organized by responsibility:
//! - [`battle`] hosts the orchestrator and builder
//! - [`api`] exposes the error type and collaborator interfaces
//! - [`pickups`] owns the pickup arena, respawns and forced drops
//! - [`effects`] implements the combat effect activation protocol
//! - [`timed`] and [`scheduler`] provide generation-stamped timed transitions
//! - [`visibility`] tracks what each observer currently sees
//! - [`events`] provides topic-based event bus for flexible event routing
pub mod actors;
pub mod api;
pub mod battle;
pub mod context;
pub mod effects;
pub mod events;
pub mod minefield;
pub mod modules;
pub mod pickups;
pub mod scheduler;
pub mod timed;
pub mod visibility;

pub use actors::{ActorQuery, BattleActor, Roster};
pub use api::{
    BattleError, EffectDescriptor, EffectDetail, ImpactSink, ObserverConnection, PickupRewards,
    Representation, RepresentationBuilder, Result,
};
pub use battle::{Battle, BattleBuilder, BattleLoop};
pub use context::BattleContext;
pub use effects::{Effect, EffectCollection, EffectSpec, SplashHandler};
pub use events::{EffectEvent, Event, EventBus, MineEvent, PickupEvent, Topic};
pub use minefield::Minefield;
pub use modules::{AlwaysActiveModule, BackhitDefenceModule};
pub use pickups::{CappedIntervalPolicy, GoldDropPolicy, Pickup, PickupLifecycleManager};
pub use scheduler::Scheduler;
pub use timed::{CooldownTarget, Generation, TimedStateMachine};
pub use visibility::{Observer, ObserverRegistry};
