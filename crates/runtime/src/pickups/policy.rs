//! Eligibility rules for forced gold drops.

use std::time::Duration;

use tokio::time::Instant;

use battle_core::GoldDropConfig;

/// Decides whether another gold drop may happen right now.
pub trait GoldDropPolicy: Send + Sync {
    /// `dropped` is the number of successful gold drops so far and
    /// `last_drop` the time of the most recent one.
    fn allows(&self, dropped: u32, last_drop: Option<Instant>, now: Instant) -> bool;
}

/// Per-battle cap combined with a minimum spacing between drops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CappedIntervalPolicy {
    max_per_battle: Option<u32>,
    min_interval: Duration,
}

impl CappedIntervalPolicy {
    pub fn new(max_per_battle: Option<u32>, min_interval: Duration) -> Self {
        Self {
            max_per_battle,
            min_interval,
        }
    }
}

impl From<&GoldDropConfig> for CappedIntervalPolicy {
    fn from(config: &GoldDropConfig) -> Self {
        Self::new(config.max_per_battle, config.min_interval())
    }
}

impl GoldDropPolicy for CappedIntervalPolicy {
    fn allows(&self, dropped: u32, last_drop: Option<Instant>, now: Instant) -> bool {
        if self.max_per_battle.is_some_and(|max| dropped >= max) {
            return false;
        }
        last_drop.is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval)
    }
}
