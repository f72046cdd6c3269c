//! Read-only occupancy snapshot
//!
//! Which hexes hold an army or a structure, and who owns them. Refreshed by
//! the sync layer between planning calls; planners never mutate it.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::map::HexCoord;
use crate::core::types::{EntityId, OwnerId};

/// A unit standing on a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub entity: EntityId,
    pub owner: OwnerId,
}

impl Occupant {
    pub fn new(entity: EntityId, owner: OwnerId) -> Self {
        Self { entity, owner }
    }
}

/// Whose unit occupies a hex, relative to the planning player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Mine,
    Foreign,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupancyMaps {
    armies: AHashMap<HexCoord, Occupant>,
    structures: AHashMap<HexCoord, Occupant>,
}

impl OccupancyMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_army(&mut self, coord: HexCoord, occupant: Occupant) {
        self.armies.insert(coord, occupant);
    }

    pub fn place_structure(&mut self, coord: HexCoord, occupant: Occupant) {
        self.structures.insert(coord, occupant);
    }

    pub fn remove_army(&mut self, coord: &HexCoord) -> Option<Occupant> {
        self.armies.remove(coord)
    }

    pub fn with_army(mut self, coord: HexCoord, occupant: Occupant) -> Self {
        self.place_army(coord, occupant);
        self
    }

    pub fn with_structure(mut self, coord: HexCoord, occupant: Occupant) -> Self {
        self.place_structure(coord, occupant);
        self
    }

    pub fn army_at(&self, coord: &HexCoord) -> Option<&Occupant> {
        self.armies.get(coord)
    }

    pub fn structure_at(&self, coord: &HexCoord) -> Option<&Occupant> {
        self.structures.get(coord)
    }

    pub fn is_occupied(&self, coord: &HexCoord) -> bool {
        self.armies.contains_key(coord) || self.structures.contains_key(coord)
    }

    /// Ownership of whatever occupies `coord`
    ///
    /// A hex counts as `Mine` if either the army or the structure on it
    /// belongs to `player`.
    pub fn ownership(&self, coord: &HexCoord, player: OwnerId) -> Option<Ownership> {
        let army = self.armies.get(coord);
        let structure = self.structures.get(coord);
        if army.is_none() && structure.is_none() {
            return None;
        }

        let mine = army.is_some_and(|o| o.owner == player)
            || structure.is_some_and(|o| o.owner == player);
        Some(if mine {
            Ownership::Mine
        } else {
            Ownership::Foreign
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hex_has_no_ownership() {
        let maps = OccupancyMaps::new();
        assert_eq!(maps.ownership(&HexCoord::new(0, 0), OwnerId(1)), None);
        assert!(!maps.is_occupied(&HexCoord::new(0, 0)));
    }

    #[test]
    fn test_ownership_classification() {
        let me = OwnerId(1);
        let them = OwnerId(2);
        let maps = OccupancyMaps::new()
            .with_army(HexCoord::new(1, 0), Occupant::new(EntityId(10), me))
            .with_structure(HexCoord::new(2, 0), Occupant::new(EntityId(11), them))
            .with_army(HexCoord::new(3, 0), Occupant::new(EntityId(12), them))
            .with_structure(HexCoord::new(3, 0), Occupant::new(EntityId(13), me));

        assert_eq!(maps.ownership(&HexCoord::new(1, 0), me), Some(Ownership::Mine));
        assert_eq!(maps.ownership(&HexCoord::new(2, 0), me), Some(Ownership::Foreign));
        assert_eq!(maps.ownership(&HexCoord::new(3, 0), me), Some(Ownership::Mine));
    }
}
