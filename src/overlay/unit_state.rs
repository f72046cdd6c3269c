//! Unit and tile state as seen by the client
//!
//! The overlay store specialised to explorer and tile fields, plus views
//! that project pending overlays onto the planner's inputs.

use serde::{Deserialize, Serialize};

use super::store::{Categorized, FieldCategory, OverlayStore};
use crate::campaign::map::HexCoord;
use crate::campaign::occupancy::{OccupancyMaps, Occupant};
use crate::campaign::stamina::StaminaState;
use crate::campaign::supply::{FoodLedger, FoodReserves};
use crate::campaign::unit::Explorer;
use crate::core::types::{EntityId, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKey {
    Unit(EntityId),
    Tile(HexCoord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateField {
    Position,
    TileOccupant,
    Stamina,
    Wheat,
    Fish,
    CarriedWeight,
}

impl Categorized for StateField {
    fn category(&self) -> FieldCategory {
        match self {
            StateField::Position | StateField::TileOccupant => FieldCategory::Visual,
            StateField::Stamina | StateField::Wheat | StateField::Fish | StateField::CarriedWeight => {
                FieldCategory::NonVisual
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Coord(HexCoord),
    Occupant(Option<Occupant>),
    Stamina(StaminaState),
    Amount(u64),
}

impl FieldValue {
    pub fn as_coord(&self) -> Option<HexCoord> {
        match self {
            FieldValue::Coord(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_occupant(&self) -> Option<Option<Occupant>> {
        match self {
            FieldValue::Occupant(o) => Some(*o),
            _ => None,
        }
    }

    pub fn as_stamina(&self) -> Option<StaminaState> {
        match self {
            FieldValue::Stamina(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<u64> {
        match self {
            FieldValue::Amount(a) => Some(*a),
            _ => None,
        }
    }
}

pub type StateOverlays = OverlayStore<StateKey, StateField, FieldValue>;

/// Confirmed unit state plus pending overlays
#[derive(Debug, Clone, Default)]
pub struct UnitStateStore {
    store: StateOverlays,
}

impl UnitStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> &StateOverlays {
        &self.store
    }

    pub fn overlays_mut(&mut self) -> &mut StateOverlays {
        &mut self.store
    }

    /// Seed the confirmed layer from an authoritative explorer snapshot
    pub fn record_explorer(&mut self, explorer: &Explorer) {
        let key = StateKey::Unit(explorer.id);
        self.store.confirm(key, StateField::Position, FieldValue::Coord(explorer.coord));
        self.store.confirm(key, StateField::Stamina, FieldValue::Stamina(explorer.stamina));
        self.store.confirm(
            key,
            StateField::CarriedWeight,
            FieldValue::Amount(explorer.carried_kg),
        );
    }

    /// Effective position of a unit
    pub fn position(&self, unit: EntityId) -> Option<HexCoord> {
        self.store
            .get(&StateKey::Unit(unit), &StateField::Position)
            .and_then(FieldValue::as_coord)
    }

    /// Effective occupant of a tile, if the tile has been written at all
    pub fn tile_occupant(&self, hex: HexCoord) -> Option<Option<Occupant>> {
        self.store
            .get(&StateKey::Tile(hex), &StateField::TileOccupant)
            .and_then(FieldValue::as_occupant)
    }

    fn unit_amount(&self, unit: EntityId, field: StateField) -> Option<u64> {
        self.store
            .speculative(&StateKey::Unit(unit), &field)
            .and_then(FieldValue::as_amount)
    }

    /// The explorer as it will look once pending actions land
    ///
    /// Its `coord` is the natural `origin_override` for a re-plan.
    pub fn explorer_view(&self, explorer: &Explorer) -> Explorer {
        let key = StateKey::Unit(explorer.id);
        let mut view = explorer.clone();
        if let Some(coord) = self
            .store
            .speculative(&key, &StateField::Position)
            .and_then(FieldValue::as_coord)
        {
            view.coord = coord;
        }
        if let Some(stamina) = self
            .store
            .speculative(&key, &StateField::Stamina)
            .and_then(FieldValue::as_stamina)
        {
            view.stamina = stamina;
        }
        if let Some(carried) = self.unit_amount(explorer.id, StateField::CarriedWeight) {
            view.carried_kg = carried;
        }
        view
    }

    /// Occupancy snapshot with speculative tile flips applied
    pub fn occupancy_view(&self, occupancy: &OccupancyMaps) -> OccupancyMaps {
        let mut view = occupancy.clone();
        for ((key, field), value) in self.store.overlaid() {
            let (StateKey::Tile(hex), StateField::TileOccupant) = (key, field) else {
                continue;
            };
            match value.as_occupant() {
                Some(Some(occupant)) => view.place_army(hex, occupant),
                Some(None) => {
                    view.remove_army(&hex);
                }
                None => {}
            }
        }
        view
    }
}

/// Food ledger that reports speculatively decremented reserves
pub struct SpeculativeLedger<'a> {
    inner: &'a dyn FoodLedger,
    state: &'a UnitStateStore,
}

impl<'a> SpeculativeLedger<'a> {
    pub fn new(inner: &'a dyn FoodLedger, state: &'a UnitStateStore) -> Self {
        Self { inner, state }
    }
}

impl FoodLedger for SpeculativeLedger<'_> {
    fn food(&self, unit: EntityId, tick: Tick) -> FoodReserves {
        let base = self.inner.food(unit, tick);
        FoodReserves {
            wheat: self
                .state
                .unit_amount(unit, StateField::Wheat)
                .unwrap_or(base.wheat),
            fish: self
                .state
                .unit_amount(unit, StateField::Fish)
                .unwrap_or(base.fish),
        }
    }
}
