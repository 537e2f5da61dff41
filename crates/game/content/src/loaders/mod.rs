//! Content loaders for reading battle data from files.
//!
//! This module provides loaders that convert TOML/RON files into `battle-core`
//! types. Every loader validates what it reads, so a battle never starts from
//! inconsistent data.

pub mod config;
pub mod factory;
pub mod placement;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use placement::PlacementLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
