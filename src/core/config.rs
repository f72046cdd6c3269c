//! Game configuration with documented constants
//!
//! Every cost table the planner and the movement executor consult lives here.
//! The values mirror what the authoritative backend is configured with; the
//! client only uses them to predict what the backend will accept.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{MarchError, Result};
use crate::core::types::TroopCategory;

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapConfig,
    pub stamina: StaminaConfig,
    pub food: FoodConfig,
    pub exploration: ExplorationConfig,
}

/// Grid layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Fixed offset of the grid origin
    ///
    /// Stored coordinates are absolute; subtracting the centre yields the
    /// small signed coordinates used for display and for map keys in logs.
    pub center: i64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: 2_147_483_646,
        }
    }
}

/// Stamina regeneration and spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Stamina regained per elapsed tick
    pub gain_per_tick: u64,

    /// Biome modifier added to or removed from the base travel cost
    ///
    /// Water makes every troop faster, forests slow paladins down, open and
    /// cold biomes speed paladins up. See `campaign::costs`.
    pub bonus_value: u64,

    /// Base stamina cost of moving one hex
    pub travel_cost: u64,

    /// Stamina cost of exploring an adjacent hex
    pub explore_cost: u64,

    /// Lower bound for the cheapest possible step
    ///
    /// Used to derive the maximum travel distance. Must be non-zero.
    pub min_step_floor: u64,

    /// Stamina cap per troop category
    pub knight_max: u64,
    pub crossbowman_max: u64,
    pub paladin_max: u64,

    /// Cap used when a category has no configured entry (zero entries count as missing)
    pub default_max: u64,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            gain_per_tick: 20,
            bonus_value: 10,
            travel_cost: 20,
            explore_cost: 30,
            min_step_floor: 10,
            knight_max: 120,
            crossbowman_max: 120,
            paladin_max: 140,
            default_max: 120,
        }
    }
}

impl StaminaConfig {
    /// Configured cap for a troop category, zero meaning "not configured"
    pub fn configured_max(&self, category: TroopCategory) -> Option<u64> {
        let max = match category {
            TroopCategory::Knight => self.knight_max,
            TroopCategory::Crossbowman => self.crossbowman_max,
            TroopCategory::Paladin => self.paladin_max,
        };
        (max > 0).then_some(max)
    }
}

/// Food cost schedules, expressed per 100 troops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub explore_wheat_per_100: u64,
    pub explore_fish_per_100: u64,
    pub travel_wheat_per_100: u64,
    pub travel_fish_per_100: u64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            explore_wheat_per_100: 2,
            explore_fish_per_100: 1,
            travel_wheat_per_100: 1,
            travel_fish_per_100: 1,
        }
    }
}

/// Exploration reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    /// Weight (kg) of the resources found when exploring a hex
    ///
    /// An explorer without this much free carry capacity cannot explore.
    pub reward_weight_kg: u64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            reward_weight_kg: 100,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML string and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.stamina.min_step_floor == 0 {
            return Err(MarchError::Config(
                "stamina.min_step_floor must be positive".into(),
            ));
        }

        if self.stamina.default_max == 0 {
            return Err(MarchError::Config(
                "stamina.default_max must be positive".into(),
            ));
        }

        let largest_cap = TroopCategory::ALL
            .iter()
            .filter_map(|c| self.stamina.configured_max(*c))
            .max()
            .unwrap_or(self.stamina.default_max);
        if self.stamina.explore_cost > largest_cap {
            return Err(MarchError::Config(format!(
                "stamina.explore_cost ({}) exceeds every stamina cap ({})",
                self.stamina.explore_cost, largest_cap
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [stamina]
            gain_per_tick = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.stamina.gain_per_tick, 7);
        assert_eq!(config.stamina.travel_cost, 20);
        assert_eq!(config.exploration.reward_weight_kg, 100);
    }

    #[test]
    fn test_zero_floor_rejected() {
        let result = GameConfig::from_toml_str(
            r#"
            [stamina]
            min_step_floor = 0
            "#,
        );
        assert!(matches!(result, Err(MarchError::Config(_))));
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let result = GameConfig::from_toml_str("[stamina\n");
        assert!(matches!(result, Err(MarchError::Toml(_))));
    }

    #[test]
    fn test_unconfigured_cap_is_none() {
        let mut stamina = StaminaConfig::default();
        stamina.paladin_max = 0;
        assert_eq!(stamina.configured_max(TroopCategory::Paladin), None);
        assert_eq!(stamina.configured_max(TroopCategory::Knight), Some(120));
    }

    #[test]
    fn test_sample_config_parses() {
        let config = GameConfig::from_toml_str(include_str!("../../data/frontier.toml")).unwrap();
        assert_eq!(config.map.center, 2_147_483_646);
    }
}
