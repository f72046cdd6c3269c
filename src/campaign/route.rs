//! Action path planning
//!
//! Given a snapshot of the map and a unit's budget, find every hex the unit
//! can act on this turn and the cheapest way to get there. Explorers run a
//! uniform-cost search over stamina; structures only look at their six
//! neighbours.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::costs::CostTable;
use super::map::{Biome, ExploredMap, HexCoord};
use super::occupancy::{OccupancyMaps, Ownership};
use super::supply::{Budget, FoodLedger};
use super::unit::{Explorer, Structure};
use crate::core::config::GameConfig;
use crate::core::types::{EntityId, OwnerId, Tick};

/// What happens when a unit reaches a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Move,
    Attack,
    Help,
    Explore,
}

/// One hex of an action path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStep {
    pub hex: HexCoord,
    pub action: ActionType,
    pub biome: Option<Biome>,
    pub stamina_cost: Option<u64>,
}

impl ActionStep {
    /// The starting hex of every path
    pub fn origin(hex: HexCoord) -> Self {
        Self {
            hex,
            action: ActionType::Move,
            biome: None,
            stamina_cost: None,
        }
    }
}

/// Ordered steps from a unit's origin to a target hex
///
/// The first step is always the origin tagged `Move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPath {
    steps: Vec<ActionStep>,
}

impl ActionPath {
    pub fn new(steps: Vec<ActionStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    pub fn origin(&self) -> Option<HexCoord> {
        self.steps.first().map(|s| s.hex)
    }

    pub fn destination(&self) -> Option<HexCoord> {
        self.steps.last().map(|s| s.hex)
    }

    /// Action performed on the final hex
    pub fn action(&self) -> Option<ActionType> {
        self.steps.last().map(|s| s.action)
    }

    pub fn hexes(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.steps.iter().map(|s| s.hex)
    }

    /// Number of hops, excluding the origin
    pub fn hops(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Cumulative stamina of the whole path
    pub fn total_stamina(&self) -> u64 {
        self.steps.iter().filter_map(|s| s.stamina_cost).sum()
    }
}

/// A reachable hex and what can be done there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedHex {
    pub hex: HexCoord,
    pub action: ActionType,
}

/// Cheapest known path to every reachable hex
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPathSet {
    paths: AHashMap<HexCoord, ActionPath>,
}

impl ActionPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hex: &HexCoord) -> Option<&ActionPath> {
        self.paths.get(hex)
    }

    pub fn contains(&self, hex: &HexCoord) -> bool {
        self.paths.contains_key(hex)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HexCoord, &ActionPath)> {
        self.paths.iter()
    }

    /// Flattened list for rendering, sorted by hex, origin omitted
    pub fn highlighted(&self) -> Vec<HighlightedHex> {
        let mut hexes: Vec<HighlightedHex> = self
            .paths
            .iter()
            .filter_map(|(hex, path)| {
                let action = path.action()?;
                (path.origin() != Some(*hex)).then_some(HighlightedHex { hex: *hex, action })
            })
            .collect();
        hexes.sort_by_key(|h| h.hex);
        hexes
    }

    fn insert(&mut self, hex: HexCoord, path: ActionPath) {
        self.paths.insert(hex, path);
    }
}

/// Frontier entry; ordered so that `BinaryHeap` pops the cheapest, oldest node first
struct Node {
    coord: HexCoord,
    stamina_used: u64,
    distance: u64,
    seq: u64,
    trail: usize,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.stamina_used == other.stamina_used && self.seq == other.seq
    }
}
impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .stamina_used
            .cmp(&self.stamina_used)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Steps discovered during a search, linked back toward the origin
struct Trail {
    origin: HexCoord,
    entries: Vec<(ActionStep, Option<usize>)>,
}

impl Trail {
    fn new(origin: HexCoord) -> Self {
        Self {
            origin,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, step: ActionStep, parent: Option<usize>) -> usize {
        self.entries.push((step, parent));
        self.entries.len() - 1
    }

    fn path(&self, mut index: usize) -> ActionPath {
        let mut steps = Vec::new();
        loop {
            let (step, parent) = self.entries[index];
            steps.push(step);
            match parent {
                Some(p) => index = p,
                None => break,
            }
        }
        steps.push(ActionStep::origin(self.origin));
        steps.reverse();
        ActionPath::new(steps)
    }
}

/// Path planner for a mobile unit
pub struct ArmyPlanner<'a> {
    config: &'a GameConfig,
    explorer: &'a Explorer,
    ledger: &'a dyn FoodLedger,
}

impl<'a> ArmyPlanner<'a> {
    pub fn new(config: &'a GameConfig, explorer: &'a Explorer, ledger: &'a dyn FoodLedger) -> Self {
        Self {
            config,
            explorer,
            ledger,
        }
    }

    /// Budget the explorer has for this turn
    pub fn budget(&self, current_tick: Tick, armies_tick: Tick) -> Budget {
        let food = self.ledger.food(self.explorer.id, current_tick);
        Budget::compute(self.config, self.explorer, food, armies_tick)
    }

    /// Every hex the explorer can act on this turn, with its cheapest path
    ///
    /// `origin_override` takes precedence over the explorer's recorded
    /// coordinate: a speculative move may already have advanced the unit.
    pub fn find_action_paths(
        &self,
        occupancy: &OccupancyMaps,
        explored: &ExploredMap,
        current_tick: Tick,
        armies_tick: Tick,
        player: OwnerId,
        origin_override: Option<HexCoord>,
    ) -> ActionPathSet {
        let mut result = ActionPathSet::new();
        let budget = self.budget(current_tick, armies_tick);
        if budget.stamina_available == 0 {
            tracing::debug!(unit = %self.explorer.id, ?budget, "no movement budget");
            return result;
        }

        let costs = CostTable::new(self.config);
        let category = self.explorer.category;
        let origin = origin_override.unwrap_or(self.explorer.coord);
        let occupied = |hex: &HexCoord| self.occupied_by_other(occupancy, hex);

        let mut trail = Trail::new(origin);
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;

        for hex in origin.neighbors() {
            let biome = explored.biome(&hex);

            let (action, cost) = match biome {
                None if !budget.can_explore => continue,
                None => (ActionType::Explore, costs.explore_stamina_cost()),
                Some(biome) => {
                    let action = if occupied(&hex) {
                        match occupancy.ownership(&hex, player) {
                            Some(Ownership::Mine) => ActionType::Help,
                            _ => ActionType::Attack,
                        }
                    } else if budget.max_travel_distance == 0 {
                        // No food for a single travel step
                        continue;
                    } else {
                        ActionType::Move
                    };
                    (action, costs.travel_stamina_cost(biome, category))
                }
            };

            if cost > budget.stamina_available {
                continue;
            }

            let step = ActionStep {
                hex,
                action,
                biome,
                stamina_cost: Some(cost),
            };
            frontier.push(Node {
                coord: hex,
                stamina_used: cost,
                distance: 1,
                seq,
                trail: trail.push(step, None),
            });
            seq += 1;
        }

        let mut lowest: AHashMap<HexCoord, u64> = AHashMap::new();

        while let Some(current) = frontier.pop() {
            if lowest
                .get(&current.coord)
                .is_some_and(|best| *best <= current.stamina_used)
            {
                continue;
            }
            lowest.insert(current.coord, current.stamina_used);
            result.insert(current.coord, trail.path(current.trail));

            // Unexplored and occupied hexes end a path
            if !explored.is_explored(&current.coord) || occupied(&current.coord) {
                continue;
            }

            let next_distance = current.distance + 1;
            if next_distance > budget.max_travel_distance {
                continue;
            }

            for hex in current.coord.neighbors() {
                if hex == origin || occupied(&hex) {
                    continue;
                }
                let Some(biome) = explored.biome(&hex) else {
                    continue;
                };

                let cost = costs.travel_stamina_cost(biome, category);
                let next_used = current.stamina_used + cost;
                if next_used > budget.stamina_available {
                    continue;
                }
                if lowest.get(&hex).is_some_and(|best| *best <= next_used) {
                    continue;
                }

                let step = ActionStep {
                    hex,
                    action: ActionType::Move,
                    biome: Some(biome),
                    stamina_cost: Some(cost),
                };
                frontier.push(Node {
                    coord: hex,
                    stamina_used: next_used,
                    distance: next_distance,
                    seq,
                    trail: trail.push(step, Some(current.trail)),
                });
                seq += 1;
            }
        }

        tracing::debug!(
            unit = %self.explorer.id,
            %origin,
            stamina = budget.stamina_available,
            max_distance = budget.max_travel_distance,
            can_explore = budget.can_explore,
            reachable = result.len(),
            "planned action paths"
        );

        result
    }

    /// Occupied by any unit other than the planning explorer itself
    fn occupied_by_other(&self, occupancy: &OccupancyMaps, hex: &HexCoord) -> bool {
        let is_other = |entity: EntityId| entity != self.explorer.id;
        occupancy.army_at(hex).is_some_and(|o| is_other(o.entity))
            || occupancy.structure_at(hex).is_some_and(|o| is_other(o.entity))
    }
}

/// Path planner for an immobile unit
pub struct StructurePlanner<'a> {
    structure: &'a Structure,
}

impl<'a> StructurePlanner<'a> {
    pub fn new(structure: &'a Structure) -> Self {
        Self { structure }
    }

    /// Adjacent armies the structure can attack or reinforce
    pub fn find_action_paths(
        &self,
        occupancy: &OccupancyMaps,
        explored: &ExploredMap,
        player: OwnerId,
    ) -> ActionPathSet {
        let mut result = ActionPathSet::new();
        let origin = self.structure.coord;

        for hex in origin.neighbors() {
            let Some(army) = occupancy.army_at(&hex) else {
                continue;
            };
            let action = if army.owner == player {
                ActionType::Help
            } else {
                ActionType::Attack
            };
            let target = ActionStep {
                hex,
                action,
                biome: explored.biome(&hex),
                stamina_cost: None,
            };
            result.insert(hex, ActionPath::new(vec![ActionStep::origin(origin), target]));
        }

        tracing::debug!(structure = %self.structure.id, targets = result.len(), "planned structure actions");
        result
    }
}
