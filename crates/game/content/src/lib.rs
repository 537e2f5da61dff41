//! Static battle content loaders.
//!
//! This crate reads the data a battle needs before it starts:
//! - Battle tunables (data-driven via TOML)
//! - Pickup placements per map (data-driven via RON)
//!
//! Content is consumed once while a battle is assembled and never mutated
//! afterwards. All loaders produce `battle-core` types directly.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, PlacementLoader};
