//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`BattleConfig::default`]. The result is
    /// validated before it is returned.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        config.validate()?;
        Ok(config)
    }
}
