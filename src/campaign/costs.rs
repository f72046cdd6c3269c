//! Movement, exploration and food cost tables
//!
//! Thin lookups over `GameConfig`. All amounts are whole units.

use serde::{Deserialize, Serialize};

use super::map::Biome;
use crate::core::config::GameConfig;
use crate::core::types::TroopCategory;

/// Wheat and fish paid for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FoodCost {
    pub wheat: u64,
    pub fish: u64,
}

/// Which schedule an action pays food from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelKind {
    Explore,
    Travel,
}

/// Cost tables derived from a config
#[derive(Debug, Clone, Copy)]
pub struct CostTable<'a> {
    config: &'a GameConfig,
}

impl<'a> CostTable<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// Stamina needed to move onto a hex of the given biome
    pub fn travel_stamina_cost(&self, biome: Biome, category: TroopCategory) -> u64 {
        let base = self.config.stamina.travel_cost;
        let bonus = self.config.stamina.bonus_value;
        let paladin = category == TroopCategory::Paladin;

        match biome {
            Biome::Ocean | Biome::DeepOcean => base.saturating_sub(bonus),
            Biome::Beach => base,
            Biome::Grassland
            | Biome::Shrubland
            | Biome::SubtropicalDesert
            | Biome::TemperateDesert
            | Biome::Tundra
            | Biome::Bare => {
                if paladin {
                    base.saturating_sub(bonus)
                } else {
                    base
                }
            }
            Biome::TropicalRainForest
            | Biome::TropicalSeasonalForest
            | Biome::TemperateRainForest
            | Biome::TemperateDeciduousForest
            | Biome::Taiga => {
                if paladin {
                    base + bonus
                } else {
                    base
                }
            }
            Biome::Snow => {
                if paladin {
                    base
                } else {
                    base + bonus
                }
            }
            Biome::Scorched => base + bonus,
        }
    }

    /// Cheapest step any biome allows for this category, floored by config
    pub fn min_step_cost(&self, category: TroopCategory) -> u64 {
        let cheapest = Biome::ALL
            .iter()
            .map(|b| self.travel_stamina_cost(*b, category))
            .min()
            .unwrap_or(self.config.stamina.travel_cost);
        cheapest.max(self.config.stamina.min_step_floor)
    }

    pub fn explore_stamina_cost(&self) -> u64 {
        self.config.stamina.explore_cost
    }

    /// Food owed by a unit of `troop_count` troops for one action step
    pub fn food_cost(&self, kind: TravelKind, troop_count: u64) -> FoodCost {
        let food = &self.config.food;
        let (wheat, fish) = match kind {
            TravelKind::Explore => (food.explore_wheat_per_100, food.explore_fish_per_100),
            TravelKind::Travel => (food.travel_wheat_per_100, food.travel_fish_per_100),
        };
        FoodCost {
            wheat: wheat.saturating_mul(troop_count) / 100,
            fish: fish.saturating_mul(troop_count) / 100,
        }
    }

    pub fn explore_reward_weight(&self) -> u64 {
        self.config.exploration.reward_weight_kg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.stamina.travel_cost = 20;
        config.stamina.bonus_value = 10;
        config
    }

    #[test]
    fn test_water_is_cheaper_for_everyone() {
        let config = table_config();
        let table = CostTable::new(&config);
        for category in TroopCategory::ALL {
            assert_eq!(table.travel_stamina_cost(Biome::Ocean, category), 10);
            assert_eq!(table.travel_stamina_cost(Biome::DeepOcean, category), 10);
        }
    }

    #[test]
    fn test_paladin_forest_and_open_ground() {
        let config = table_config();
        let table = CostTable::new(&config);
        assert_eq!(table.travel_stamina_cost(Biome::Taiga, TroopCategory::Paladin), 30);
        assert_eq!(table.travel_stamina_cost(Biome::Taiga, TroopCategory::Knight), 20);
        assert_eq!(table.travel_stamina_cost(Biome::Grassland, TroopCategory::Paladin), 10);
        assert_eq!(table.travel_stamina_cost(Biome::Tundra, TroopCategory::Crossbowman), 20);
    }

    #[test]
    fn test_snow_and_scorched() {
        let config = table_config();
        let table = CostTable::new(&config);
        assert_eq!(table.travel_stamina_cost(Biome::Snow, TroopCategory::Paladin), 20);
        assert_eq!(table.travel_stamina_cost(Biome::Snow, TroopCategory::Knight), 30);
        for category in TroopCategory::ALL {
            assert_eq!(table.travel_stamina_cost(Biome::Scorched, category), 30);
        }
    }

    #[test]
    fn test_bonus_larger_than_base_saturates() {
        let mut config = table_config();
        config.stamina.bonus_value = 50;
        let table = CostTable::new(&config);
        assert_eq!(table.travel_stamina_cost(Biome::Ocean, TroopCategory::Knight), 0);
    }

    #[test]
    fn test_min_step_cost_respects_floor() {
        let mut config = table_config();
        config.stamina.min_step_floor = 1;
        assert_eq!(CostTable::new(&config).min_step_cost(TroopCategory::Knight), 10);

        config.stamina.min_step_floor = 15;
        assert_eq!(CostTable::new(&config).min_step_cost(TroopCategory::Knight), 15);
    }

    #[test]
    fn test_food_cost_scales_with_troops() {
        let config = GameConfig::default();
        let table = CostTable::new(&config);
        let cost = table.food_cost(TravelKind::Explore, 1_000);
        assert_eq!(cost, FoodCost { wheat: 20, fish: 10 });
        let cost = table.food_cost(TravelKind::Travel, 250);
        assert_eq!(cost, FoodCost { wheat: 2, fish: 2 });
    }
}
