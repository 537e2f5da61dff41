//! Pure data model for transient battle objects.
//!
//! `battle-core` defines the vocabulary shared by the runtime and the content
//! loaders: identifiers and positions, pickup kinds and placements, effect
//! kinds, the tunable [`BattleConfig`], setup errors, and the [`Mine`] proximity
//! trigger. Nothing here is asynchronous; the runtime crate owns scheduling,
//! visibility, and orchestration.
pub mod config;
pub mod error;
pub mod mine;
pub mod state;

pub use config::{
    BackhitDefenceConfig, BattleConfig, EmpConfig, GoldDropConfig, KamikadzeConfig, MineConfig,
    PickupConfig, SplashProfile,
};
pub use error::SetupError;
pub use mine::{Mine, MineBinding, MineKey};
pub use state::{
    ActorId, ActorTag, EffectKind, Handle, ObserverId, PickupKind, Placement, PlacementTable,
    Position, TeamId, TimedState,
};
