//! Food reserves and per-turn movement budget
//!
//! Explorers pay wheat and fish for every step and every exploration. The
//! balances themselves are owned by an external production engine, consulted
//! here only through the `FoodLedger` query seam.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::costs::{CostTable, TravelKind};
use super::unit::Explorer;
use crate::core::config::GameConfig;
use crate::core::types::{EntityId, Tick};

/// Wheat and fish available to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FoodReserves {
    pub wheat: u64,
    pub fish: u64,
}

impl FoodReserves {
    pub fn new(wheat: u64, fish: u64) -> Self {
        Self { wheat, fish }
    }
}

/// Balance query against the resource/production engine
pub trait FoodLedger: Send + Sync {
    /// Food available to `unit` as of `tick`, production included
    fn food(&self, unit: EntityId, tick: Tick) -> FoodReserves;
}

/// Balance of one unit, growing linearly with production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReserveAccount {
    pub reserves: FoodReserves,
    pub wheat_per_tick: u64,
    pub fish_per_tick: u64,
    pub since_tick: Tick,
}

impl ReserveAccount {
    pub fn fixed(reserves: FoodReserves) -> Self {
        Self {
            reserves,
            ..Self::default()
        }
    }

    pub fn with_production(mut self, wheat_per_tick: u64, fish_per_tick: u64, since_tick: Tick) -> Self {
        self.wheat_per_tick = wheat_per_tick;
        self.fish_per_tick = fish_per_tick;
        self.since_tick = since_tick;
        self
    }

    /// Balance at `tick`
    pub fn balance_at(&self, tick: Tick) -> FoodReserves {
        let elapsed = tick.saturating_sub(self.since_tick);
        FoodReserves {
            wheat: self
                .reserves
                .wheat
                .saturating_add(elapsed.saturating_mul(self.wheat_per_tick)),
            fish: self
                .reserves
                .fish
                .saturating_add(elapsed.saturating_mul(self.fish_per_tick)),
        }
    }
}

/// In-memory ledger, for tests and the demo binary
#[derive(Debug, Clone, Default)]
pub struct StaticLedger {
    accounts: AHashMap<EntityId, ReserveAccount>,
}

impl StaticLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, unit: EntityId, account: ReserveAccount) {
        self.accounts.insert(unit, account);
    }

    pub fn with(mut self, unit: EntityId, reserves: FoodReserves) -> Self {
        self.set(unit, ReserveAccount::fixed(reserves));
        self
    }
}

impl FoodLedger for StaticLedger {
    fn food(&self, unit: EntityId, tick: Tick) -> FoodReserves {
        self.accounts
            .get(&unit)
            .map(|account| account.balance_at(tick))
            .unwrap_or_default()
    }
}

/// What a unit can afford this turn
///
/// Derived fresh for every planning request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub stamina_available: u64,
    pub max_travel_distance: u64,
    pub can_explore: bool,
}

impl Budget {
    pub fn compute(config: &GameConfig, explorer: &Explorer, food: FoodReserves, armies_tick: Tick) -> Self {
        let costs = CostTable::new(config);
        let stamina_available = explorer.current_stamina(config, armies_tick).amount;

        // A zero per-step price puts no bound on distance
        let min_step = costs.min_step_cost(explorer.category);
        let travel_food = costs.food_cost(TravelKind::Travel, explorer.troop_count);
        let max_travel_distance = [
            stamina_available.checked_div(min_step),
            food.wheat.checked_div(travel_food.wheat),
            food.fish.checked_div(travel_food.fish),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(u64::MAX);

        let explore_food = costs.food_cost(TravelKind::Explore, explorer.troop_count);
        let can_explore = stamina_available >= costs.explore_stamina_cost()
            && food.wheat >= explore_food.wheat
            && food.fish >= explore_food.fish
            && explorer.remaining_capacity() >= costs.explore_reward_weight();

        Self {
            stamina_available,
            max_travel_distance,
            can_explore,
        }
    }
}
