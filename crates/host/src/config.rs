//! Host settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Where content lives and how long the headless battle runs.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub data_dir: PathBuf,
    pub map: String,
    pub duration: Duration,
    /// Overrides the seed from `battle.toml` when set.
    pub seed: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            map: "rio".to_string(),
            duration: Duration::from_secs(10),
            seed: None,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("BATTLE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(map) = env::var("BATTLE_MAP") {
            config.map = map;
        }
        if let Some(secs) = read_env::<u64>("BATTLE_DURATION_SECS") {
            config.duration = Duration::from_secs(secs.max(1));
        }
        config.seed = read_env::<u64>("BATTLE_SEED");

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
