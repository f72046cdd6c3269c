//! Stamina regeneration model
//!
//! Stamina is stored as `{amount, updated_tick}` and recomputed lazily from
//! the elapsed ticks whenever it is read. Regen is integer-only: fractional
//! stamina never accrues.

use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::types::{Tick, TroopCategory};

/// Denominator of `StaminaBoost::percent_num` (10_000 = 100%)
pub const BOOST_PERCENT_DENOMINATOR: u64 = 10_000;

/// Last known stamina of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaminaState {
    pub amount: u64,
    pub updated_tick: Tick,
}

impl StaminaState {
    pub fn new(amount: u64, updated_tick: Tick) -> Self {
        Self {
            amount,
            updated_tick,
        }
    }
}

/// Time-boxed regen bonus
///
/// For the first `tick_count` elapsed ticks, each tick regenerates an extra
/// `floor(gain_per_tick * percent_num / 10_000)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaminaBoost {
    pub percent_num: u64,
    pub tick_count: u64,
}

impl StaminaBoost {
    pub const NONE: StaminaBoost = StaminaBoost {
        percent_num: 0,
        tick_count: 0,
    };

    pub fn new(percent_num: u64, tick_count: u64) -> Self {
        Self {
            percent_num,
            tick_count,
        }
    }
}

/// Regen parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaminaModel {
    pub gain_per_tick: u64,
}

impl StaminaModel {
    pub fn new(gain_per_tick: u64) -> Self {
        Self { gain_per_tick }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.stamina.gain_per_tick)
    }

    /// Stamina of a unit at `current_tick`
    ///
    /// A state already at or past `current_tick` is returned unchanged.
    pub fn stamina_at(
        &self,
        state: StaminaState,
        max_stamina: u64,
        boost: StaminaBoost,
        current_tick: Tick,
    ) -> StaminaState {
        if state.updated_tick >= current_tick {
            return state;
        }

        let elapsed = current_tick - state.updated_tick;
        let base_regen = elapsed.saturating_mul(self.gain_per_tick);

        let boosted_ticks = elapsed.min(boost.tick_count);
        let boost_per_tick =
            self.gain_per_tick.saturating_mul(boost.percent_num) / BOOST_PERCENT_DENOMINATOR;
        let boost_regen = boosted_ticks.saturating_mul(boost_per_tick);

        let amount = state
            .amount
            .saturating_add(base_regen)
            .saturating_add(boost_regen)
            .min(max_stamina);

        StaminaState {
            amount,
            updated_tick: current_tick,
        }
    }
}

/// Stamina cap for a troop category
pub fn max_stamina(config: &GameConfig, category: TroopCategory) -> u64 {
    config
        .stamina
        .configured_max(category)
        .unwrap_or(config.stamina.default_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boosted_regen() {
        let model = StaminaModel::new(7);
        let state = StaminaState::new(10, 100);
        let result = model.stamina_at(state, 200, StaminaBoost::new(5_000, 4), 104);
        // 10 + 4*7 + 4*floor(7*5000/10000)
        assert_eq!(result.amount, 50);
        assert_eq!(result.updated_tick, 104);
    }

    #[test]
    fn test_boost_only_covers_its_ticks() {
        let model = StaminaModel::new(7);
        let state = StaminaState::new(10, 0);
        let result = model.stamina_at(state, 1_000, StaminaBoost::new(5_000, 4), 10);
        assert_eq!(result.amount, 10 + 70 + 12);
    }

    #[test]
    fn test_no_time_travel() {
        let model = StaminaModel::new(20);
        let state = StaminaState::new(35, 50);
        assert_eq!(model.stamina_at(state, 100, StaminaBoost::NONE, 50), state);
        assert_eq!(model.stamina_at(state, 100, StaminaBoost::NONE, 10), state);
    }

    #[test]
    fn test_regen_clamped_to_max() {
        let model = StaminaModel::new(20);
        let state = StaminaState::new(90, 0);
        let result = model.stamina_at(state, 100, StaminaBoost::new(10_000, 10), 50);
        assert_eq!(result.amount, 100);
    }

    #[test]
    fn test_fractional_boost_floors_to_zero() {
        let model = StaminaModel::new(1);
        let state = StaminaState::new(0, 0);
        let result = model.stamina_at(state, 100, StaminaBoost::new(9_999, 5), 5);
        assert_eq!(result.amount, 5);
    }

    #[test]
    fn test_max_stamina_default_for_unconfigured() {
        let mut config = GameConfig::default();
        config.stamina.crossbowman_max = 0;
        config.stamina.default_max = 77;
        assert_eq!(max_stamina(&config, TroopCategory::Crossbowman), 77);
        assert_eq!(max_stamina(&config, TroopCategory::Paladin), 140);
    }
}
