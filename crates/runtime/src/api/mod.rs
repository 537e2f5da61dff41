//! Public battle API surface.
//!
//! This module gathers the error type and the collaborator interfaces that
//! embedders implement, so the rest of the crate can stay focused on object
//! lifecycles.

pub mod collaborators;
pub mod errors;

pub use collaborators::{
    EffectDescriptor, EffectDetail, ImpactSink, ObserverConnection, PickupRewards, Representation,
    RepresentationBuilder,
};
pub use errors::{BattleError, Result};
