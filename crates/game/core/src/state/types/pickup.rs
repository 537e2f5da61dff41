//! Pickup kinds and their static placement data.

use std::collections::BTreeMap;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::SetupError;
use crate::state::types::{EffectKind, Position};

/// The five kinds of pickups a battle map can place.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PickupKind {
    Repair,
    Armor,
    Damage,
    Speed,
    /// Currency drop. Never respawns on its own; only appears through a forced drop.
    Gold,
}

impl PickupKind {
    /// Supply kinds own a permanent spawn region and cycle through cooldowns.
    pub const fn is_supply(self) -> bool {
        !matches!(self, PickupKind::Gold)
    }

    /// Timed combat effect granted to the collector, if this kind grants one.
    pub const fn boost_effect(self) -> Option<EffectKind> {
        match self {
            PickupKind::Armor => Some(EffectKind::ArmorBoost),
            PickupKind::Damage => Some(EffectKind::DamageBoost),
            PickupKind::Speed => Some(EffectKind::SpeedBoost),
            PickupKind::Repair | PickupKind::Gold => None,
        }
    }
}

/// One static spawn point for a pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub position: Position,
    /// Whether the box descends on a parachute. Presentation only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_parachute: bool,
}

impl Placement {
    pub fn new(position: Position, has_parachute: bool) -> Self {
        Self {
            position,
            has_parachute,
        }
    }
}

/// Per-kind ordered placements, loaded once before the battle starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementTable {
    entries: BTreeMap<PickupKind, Vec<Placement>>,
}

impl PlacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from kind names as they appear in map data.
    ///
    /// An unrecognised kind name is a configuration inconsistency and aborts
    /// setup, as does a non-finite position.
    pub fn from_named<I, S>(entries: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = (S, Vec<Placement>)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();

        for (name, placements) in entries {
            let name = name.as_ref();
            let kind = PickupKind::from_str(name)
                .map_err(|_| SetupError::UnknownPickupKind(name.to_owned()))?;
            table.extend(kind, placements);
        }

        table.validate()?;
        Ok(table)
    }

    /// Appends placements for `kind`, keeping their order.
    pub fn extend(&mut self, kind: PickupKind, placements: impl IntoIterator<Item = Placement>) {
        self.entries.entry(kind).or_default().extend(placements);
    }

    pub fn with(mut self, kind: PickupKind, placements: impl IntoIterator<Item = Placement>) -> Self {
        self.extend(kind, placements);
        self
    }

    pub fn get(&self, kind: PickupKind) -> &[Placement] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (PickupKind, &Placement)> + '_ {
        self.entries
            .iter()
            .flat_map(|(kind, placements)| placements.iter().map(move |p| (*kind, p)))
    }

    /// Total number of placements across all kinds.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        for (kind, placements) in &self.entries {
            if let Some(index) = placements.iter().position(|p| !p.position.is_finite()) {
                return Err(SetupError::InvalidPlacement { kind: *kind, index });
            }
        }
        Ok(())
    }
}
