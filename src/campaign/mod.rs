//! Campaign layer - hex map, units, budgets and action path planning

pub mod costs;
pub mod map;
pub mod occupancy;
pub mod route;
pub mod stamina;
pub mod supply;
pub mod unit;

pub use costs::{CostTable, FoodCost, TravelKind};
pub use map::{Biome, Direction, ExploredMap, HexCoord};
pub use occupancy::{OccupancyMaps, Occupant, Ownership};
pub use route::{ActionPath, ActionPathSet, ActionStep, ActionType, ArmyPlanner, HighlightedHex, StructurePlanner};
pub use stamina::{max_stamina, StaminaBoost, StaminaModel, StaminaState};
pub use supply::{Budget, FoodLedger, FoodReserves, ReserveAccount, StaticLedger};
pub use unit::{Explorer, Structure};
