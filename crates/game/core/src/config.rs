//! Battle tunables.
//!
//! Every numeric knob the engine reads lives here. Values are read once when a
//! battle, module or effect is constructed; changing a loaded config has no
//! effect on objects that already exist. Durations are stored in milliseconds
//! so the struct round-trips through TOML without custom codecs.

use std::time::Duration;

use crate::error::SetupError;
use crate::state::PickupKind;

/// Top-level battle configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Seed for pickup ordering and drop selection. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Interval between battle ticks when the battle drives its own loop.
    pub tick_period_ms: u64,
    /// Capacity of each event topic channel.
    pub event_buffer_size: usize,
    pub pickups: PickupConfig,
    pub gold: GoldDropConfig,
    pub kamikadze: KamikadzeConfig,
    pub mine: MineConfig,
    pub backhit_defence: BackhitDefenceConfig,
    pub emp: EmpConfig,
}

impl BattleConfig {
    pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;
    /// Upper bound for every `*_ms` tunable: one week.
    pub const MAX_DURATION_MS: u64 = 7 * 24 * 60 * 60 * 1000;

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Rejects values that would make the engine misbehave at runtime.
    pub fn validate(&self) -> Result<(), SetupError> {
        for (field, value) in self.durations() {
            if value > Self::MAX_DURATION_MS {
                return Err(invalid(field, "must not exceed one week"));
            }
        }
        if self.tick_period_ms == 0 {
            return Err(invalid("tick_period_ms", "must be positive"));
        }
        if self.event_buffer_size == 0 {
            return Err(invalid("event_buffer_size", "must be positive"));
        }
        if self.pickups.respawn_cooldown_ms == 0 {
            return Err(invalid("pickups.respawn_cooldown_ms", "must be positive"));
        }
        if self.kamikadze.grace_window_ms > self.kamikadze.safety_window_ms {
            return Err(invalid(
                "kamikadze.grace_window_ms",
                "must not exceed kamikadze.safety_window_ms",
            ));
        }
        if !self.mine.triggering_area.is_finite() || self.mine.triggering_area < 0.0 {
            return Err(invalid("mine.triggering_area", "must be a non-negative number"));
        }
        if !self.backhit_defence.multiplier.is_finite() || self.backhit_defence.multiplier < 0.0 {
            return Err(invalid(
                "backhit_defence.multiplier",
                "must be a non-negative number",
            ));
        }

        self.kamikadze.splash.validate("kamikadze.splash")?;
        self.mine.splash.validate("mine.splash")?;
        Ok(())
    }

    fn durations(&self) -> [(&'static str, u64); 10] {
        [
            ("tick_period_ms", self.tick_period_ms),
            ("pickups.initial_delay_max_ms", self.pickups.initial_delay_max_ms),
            ("pickups.respawn_cooldown_ms", self.pickups.respawn_cooldown_ms),
            ("pickups.boost_duration_ms", self.pickups.boost_duration_ms),
            ("gold.min_interval_ms", self.gold.min_interval_ms),
            ("kamikadze.duration_ms", self.kamikadze.duration_ms),
            ("kamikadze.safety_window_ms", self.kamikadze.safety_window_ms),
            ("kamikadze.grace_window_ms", self.kamikadze.grace_window_ms),
            ("mine.lifetime_ms", self.mine.lifetime_ms),
            ("emp.duration_ms", self.emp.duration_ms),
        ]
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_period_ms: Self::DEFAULT_TICK_PERIOD_MS,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            pickups: PickupConfig::default(),
            gold: GoldDropConfig::default(),
            kamikadze: KamikadzeConfig::default(),
            mine: MineConfig::default(),
            backhit_defence: BackhitDefenceConfig::default(),
            emp: EmpConfig::default(),
        }
    }
}

fn invalid(field: &'static str, reason: &'static str) -> SetupError {
    SetupError::InvalidConfig { field, reason }
}

/// Pickup spawn timings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PickupConfig {
    /// Exclusive upper bound of the random delay before a supply box first spawns.
    pub initial_delay_max_ms: u64,
    /// Cooldown after a supply box is taken before it reappears.
    pub respawn_cooldown_ms: u64,
    /// Lifetime of the boost effect granted by armor/damage/speed boxes.
    pub boost_duration_ms: u64,
}

impl PickupConfig {
    pub fn initial_delay_max(&self) -> Duration {
        Duration::from_millis(self.initial_delay_max_ms)
    }

    /// Cooldown before `kind` respawns after being taken. Gold does not respawn.
    pub fn respawn_cooldown(&self, kind: PickupKind) -> Option<Duration> {
        kind.is_supply().then(|| Duration::from_millis(self.respawn_cooldown_ms))
    }

    pub fn boost_duration(&self) -> Duration {
        Duration::from_millis(self.boost_duration_ms)
    }
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            initial_delay_max_ms: 60_000,
            respawn_cooldown_ms: 30_000,
            boost_duration_ms: 30_000,
        }
    }
}

/// Limits for forced gold drops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GoldDropConfig {
    /// Maximum number of gold drops per battle. `None` means unlimited.
    pub max_per_battle: Option<u32>,
    /// Minimum time between two gold drops.
    pub min_interval_ms: u64,
}

impl GoldDropConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Area damage parameters shared by mines and the kamikadze effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplashProfile {
    pub impact: f32,
    pub max_damage: f32,
    pub min_damage: f32,
    pub min_damage_percent: f32,
    pub radius_of_max_damage: f32,
    pub radius_of_min_damage: f32,
    /// Whether teammates of the source are hit as well.
    pub friendly_fire: bool,
}

impl SplashProfile {
    fn validate(&self, field: &'static str) -> Result<(), SetupError> {
        let values = [
            self.impact,
            self.max_damage,
            self.min_damage,
            self.min_damage_percent,
            self.radius_of_max_damage,
            self.radius_of_min_damage,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid(field, "values must be non-negative numbers"));
        }
        if self.radius_of_min_damage < self.radius_of_max_damage {
            return Err(invalid(
                field,
                "radius_of_min_damage must not be smaller than radius_of_max_damage",
            ));
        }
        Ok(())
    }
}

impl Default for SplashProfile {
    fn default() -> Self {
        Self {
            impact: 1.0,
            max_damage: 500.0,
            min_damage: 200.0,
            min_damage_percent: 20.0,
            radius_of_max_damage: 3.0,
            radius_of_min_damage: 8.0,
            friendly_fire: false,
        }
    }
}

/// Self-detonating area effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KamikadzeConfig {
    /// Duration advertised to clients.
    pub duration_ms: u64,
    /// Hard upper bound on how long the effect may stay active.
    pub safety_window_ms: u64,
    /// Time after activation during which deactivation requests are deferred.
    pub grace_window_ms: u64,
    pub splash: SplashProfile,
}

impl KamikadzeConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn safety_window(&self) -> Duration {
        Duration::from_millis(self.safety_window_ms)
    }

    pub fn grace_window(&self) -> Duration {
        Duration::from_millis(self.grace_window_ms)
    }
}

impl Default for KamikadzeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 15_000,
            safety_window_ms: 10_000,
            grace_window_ms: 1_000,
            splash: SplashProfile::default(),
        }
    }
}

/// Deployed mine parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MineConfig {
    /// Radius within which a hostile actor sets the mine off.
    pub triggering_area: f32,
    /// Distance from which the mine starts fading out for enemies.
    pub begin_hide_distance: f32,
    pub hide_range: f32,
    /// How long an untriggered mine stays on the field.
    pub lifetime_ms: u64,
    pub splash: SplashProfile,
}

impl MineConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            triggering_area: 3.0,
            begin_hide_distance: 20.0,
            hide_range: 10.0,
            lifetime_ms: 60_000,
            splash: SplashProfile::default(),
        }
    }
}

/// Passive module reducing damage taken from behind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackhitDefenceConfig {
    pub multiplier: f32,
}

impl Default for BackhitDefenceConfig {
    fn default() -> Self {
        Self { multiplier: 0.8 }
    }
}

/// Electromagnetic pulse.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmpConfig {
    /// How long the pulse stays active and accepts target lists.
    pub duration_ms: u64,
    pub radius: f32,
}

impl EmpConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for EmpConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2_000,
            radius: 25.0,
        }
    }
}
