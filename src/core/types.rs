//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for units (explorers and structures)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of the player that owns a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl OwnerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Game tick counter (regen and production time unit)
pub type Tick = u64;

/// Troop archetype, used for biome cost modifiers and stamina caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TroopCategory {
    Knight,
    Crossbowman,
    Paladin,
}

impl TroopCategory {
    pub const ALL: [TroopCategory; 3] = [Self::Knight, Self::Crossbowman, Self::Paladin];
}
