//! Pickup placement loader.
//!
//! Loads per-kind spawn points from map RON files. Kind names are resolved to
//! [`PickupKind`](battle_core::PickupKind) here; an unknown name aborts loading.

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::{Placement, PlacementTable, Position};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Placement file structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlacementDataRon {
    bonuses: BTreeMap<String, Vec<PlacementRon>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlacementRon {
    position: (f32, f32, f32), // (x, y, z)
    #[serde(default)]
    has_parachute: bool,
}

/// Loader for pickup placements from RON files.
pub struct PlacementLoader;

impl PlacementLoader {
    /// Load placements from a RON file.
    pub fn load(path: &Path) -> LoadResult<PlacementTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse placements from RON text.
    pub fn parse(content: &str) -> LoadResult<PlacementTable> {
        let data: PlacementDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse placement RON: {}", e))?;

        let entries = data.bonuses.into_iter().map(|(kind, placements)| {
            let placements = placements
                .into_iter()
                .map(|p| Placement::new(Position::from(p.position), p.has_parachute))
                .collect();
            (kind, placements)
        });

        Ok(PlacementTable::from_named(entries)?)
    }
}
