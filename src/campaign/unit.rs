//! Units on the campaign map
//!
//! Explorers move and explore; structures are immobile and can only act on
//! their six neighbours.

use serde::{Deserialize, Serialize};

use super::map::HexCoord;
use super::stamina::{max_stamina, StaminaBoost, StaminaModel, StaminaState};
use crate::core::config::GameConfig;
use crate::core::types::{EntityId, OwnerId, Tick, TroopCategory};

/// A mobile unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explorer {
    pub id: EntityId,
    pub owner: OwnerId,
    pub category: TroopCategory,
    pub troop_count: u64,
    /// Last coordinate recorded by the backend
    pub coord: HexCoord,
    pub stamina: StaminaState,
    pub boost: StaminaBoost,
    pub carried_kg: u64,
    pub capacity_kg: u64,
}

impl Explorer {
    pub fn new(id: EntityId, owner: OwnerId, category: TroopCategory, coord: HexCoord) -> Self {
        Self {
            id,
            owner,
            category,
            troop_count: 100,
            coord,
            stamina: StaminaState::default(),
            boost: StaminaBoost::NONE,
            carried_kg: 0,
            capacity_kg: 1_000,
        }
    }

    pub fn with_troops(mut self, count: u64) -> Self {
        self.troop_count = count;
        self
    }

    pub fn with_stamina(mut self, amount: u64, updated_tick: Tick) -> Self {
        self.stamina = StaminaState::new(amount, updated_tick);
        self
    }

    pub fn with_boost(mut self, boost: StaminaBoost) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_capacity(mut self, capacity_kg: u64, carried_kg: u64) -> Self {
        self.capacity_kg = capacity_kg;
        self.carried_kg = carried_kg;
        self
    }

    /// Free carry capacity in kg
    pub fn remaining_capacity(&self) -> u64 {
        self.capacity_kg.saturating_sub(self.carried_kg)
    }

    /// Regenerated stamina as of `armies_tick`
    pub fn current_stamina(&self, config: &GameConfig, armies_tick: Tick) -> StaminaState {
        StaminaModel::from_config(config).stamina_at(
            self.stamina,
            max_stamina(config, self.category),
            self.boost,
            armies_tick,
        )
    }
}

/// An immobile unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub id: EntityId,
    pub owner: OwnerId,
    pub coord: HexCoord,
}

impl Structure {
    pub fn new(id: EntityId, owner: OwnerId, coord: HexCoord) -> Self {
        Self { id, owner, coord }
    }
}
