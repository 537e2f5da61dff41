//! Content factory for loading everything a battle needs from a data directory.

use std::path::PathBuf;

use battle_core::{BattleConfig, PlacementTable};

use crate::loaders::{ConfigLoader, LoadResult, PlacementLoader};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// └── maps/
///     ├── rio.ron
///     └── silence.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `battle.toml`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("battle.toml");
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load pickup placements for `map` from `maps/<map>.ron`.
    pub fn load_placements(&self, map: &str) -> LoadResult<PlacementTable> {
        let path = self.data_dir.join("maps").join(format!("{map}.ron"));
        PlacementLoader::load(&path)
    }
}
