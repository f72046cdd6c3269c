//! Speculative movement execution
//!
//! `move_army` applies the expected outcome of a move to the unit state
//! store right away, then submits the action on the runtime and reconciles
//! when the backend answers. The caller never waits on the backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashSet;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::action::{MoveAction, Receipt, Submitter};
use crate::campaign::costs::{CostTable, TravelKind};
use crate::campaign::map::HexCoord;
use crate::campaign::occupancy::Occupant;
use crate::campaign::route::ActionPath;
use crate::campaign::stamina::StaminaState;
use crate::campaign::supply::FoodLedger;
use crate::campaign::unit::Explorer;
use crate::core::config::GameConfig;
use crate::core::error::{MarchError, Result};
use crate::core::types::{EntityId, Tick};
use crate::overlay::{
    FieldCategory, FieldValue, Mutation, OverlayId, SpeculativeLedger, StateField, StateKey,
    UnitStateStore,
};

/// How a submitted move ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Confirmed(Receipt),
    RolledBack(String),
}

impl MoveOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MoveOutcome::Confirmed(_))
    }
}

/// Sent on the notification channel once a move settles
#[derive(Debug, Clone)]
pub struct MoveReport {
    pub unit: EntityId,
    pub overlay_id: OverlayId,
    pub action: MoveAction,
    pub outcome: MoveOutcome,
}

/// Handle to an in-flight move
///
/// Dropping it does not cancel the submission.
#[derive(Debug)]
pub struct MoveTicket {
    pub overlay_id: OverlayId,
    pub action: MoveAction,
    handle: JoinHandle<MoveOutcome>,
}

impl MoveTicket {
    /// Wait for the move to settle
    ///
    /// A submission that panicked has already been rolled back when this
    /// resolves.
    pub async fn outcome(self) -> MoveOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => MoveOutcome::RolledBack(format!("submission task failed: {err}")),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct PlannedMove {
    action: MoveAction,
    origin: HexCoord,
    destination: HexCoord,
}

fn plan_move(unit: EntityId, path: &ActionPath, is_explored: bool) -> Result<PlannedMove> {
    let hexes: Vec<HexCoord> = path.hexes().collect();
    let (Some(&origin), Some(&destination)) = (hexes.first(), hexes.last()) else {
        return Err(MarchError::InvalidPath("empty path".into()));
    };
    if hexes.len() < 2 {
        return Err(MarchError::InvalidPath("path has no destination".into()));
    }

    let action = if is_explored {
        let directions: Vec<_> = hexes
            .windows(2)
            .filter_map(|pair| pair[0].direction_to(&pair[1]))
            .collect();
        if directions.is_empty() {
            return Err(MarchError::InvalidPath("no adjacent steps".into()));
        }
        MoveAction::Travel { unit, directions }
    } else {
        if hexes.len() != 2 {
            return Err(MarchError::InvalidPath(format!(
                "explore must be a single hop, got {}",
                hexes.len() - 1
            )));
        }
        let direction = origin.direction_to(&destination).ok_or_else(|| {
            MarchError::InvalidPath(format!("{destination} is not adjacent to {origin}"))
        })?;
        MoveAction::Explore { unit, direction }
    };

    Ok(PlannedMove {
        action,
        origin,
        destination,
    })
}

pub struct MovementExecutor {
    config: Arc<GameConfig>,
    submitter: Arc<dyn Submitter>,
    ledger: Arc<dyn FoodLedger>,
    state: Arc<Mutex<UnitStateStore>>,
    in_flight: Arc<Mutex<AHashSet<EntityId>>>,
    runtime: Handle,
    reports: Option<UnboundedSender<MoveReport>>,
}

impl MovementExecutor {
    pub fn new(
        config: Arc<GameConfig>,
        submitter: Arc<dyn Submitter>,
        ledger: Arc<dyn FoodLedger>,
        runtime: Handle,
    ) -> Self {
        Self {
            config,
            submitter,
            ledger,
            state: Arc::new(Mutex::new(UnitStateStore::new())),
            in_flight: Arc::new(Mutex::new(AHashSet::new())),
            runtime,
            reports: None,
        }
    }

    /// Share an existing unit state store
    pub fn with_state(mut self, state: Arc<Mutex<UnitStateStore>>) -> Self {
        self.state = state;
        self
    }

    /// Send a report for every settled move
    pub fn with_reports(mut self, reports: UnboundedSender<MoveReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn state(&self) -> Arc<Mutex<UnitStateStore>> {
        Arc::clone(&self.state)
    }

    pub fn is_in_flight(&self, unit: EntityId) -> bool {
        lock(&self.in_flight).contains(&unit)
    }

    /// Move `explorer` along `path`
    ///
    /// `explorer` is the authoritative snapshot and seeds the confirmed
    /// layer. `is_explored` tells whether the destination is already
    /// explored; an unexplored destination must be a single hop and is sent
    /// as an explore. Returns once the overlay is applied; the submission
    /// runs on the executor's runtime.
    pub fn move_army(
        &self,
        explorer: &Explorer,
        path: &ActionPath,
        is_explored: bool,
        current_tick: Tick,
        armies_tick: Tick,
    ) -> Result<MoveTicket> {
        let planned = plan_move(explorer.id, path, is_explored)?;

        if !lock(&self.in_flight).insert(explorer.id) {
            return Err(MarchError::ActionInFlight(explorer.id));
        }

        let overlay_id = OverlayId::new();
        {
            let mut state = lock(&self.state);
            state.record_explorer(explorer);
            let mutations =
                self.speculative_outcome(&state, explorer, path, &planned, current_tick, armies_tick);
            state.overlays_mut().apply(overlay_id, mutations);
        }

        tracing::info!(
            unit = %explorer.id,
            %overlay_id,
            from = %planned.origin,
            to = %planned.destination,
            hops = planned.action.hops(),
            "submitting move"
        );

        let handle = self.runtime.spawn(settle(
            Arc::clone(&self.submitter),
            Arc::clone(&self.state),
            Arc::clone(&self.in_flight),
            self.reports.clone(),
            overlay_id,
            planned.action.clone(),
        ));

        Ok(MoveTicket {
            overlay_id,
            action: planned.action,
            handle,
        })
    }

    /// Field writes describing the move as if it had already succeeded
    fn speculative_outcome(
        &self,
        state: &UnitStateStore,
        explorer: &Explorer,
        path: &ActionPath,
        planned: &PlannedMove,
        current_tick: Tick,
        armies_tick: Tick,
    ) -> Vec<Mutation<StateKey, StateField, FieldValue>> {
        let config = self.config.as_ref();
        let costs = CostTable::new(config);
        let view = state.explorer_view(explorer);
        let stamina = view.current_stamina(config, armies_tick).amount;
        let food = SpeculativeLedger::new(self.ledger.as_ref(), state).food(explorer.id, current_tick);

        let (stamina_cost, wheat_cost, fish_cost) = match &planned.action {
            MoveAction::Explore { .. } => {
                let food = costs.food_cost(TravelKind::Explore, explorer.troop_count);
                (costs.explore_stamina_cost(), food.wheat, food.fish)
            }
            MoveAction::Travel { directions, .. } => {
                let steps = directions.len() as u64;
                let per_step = costs.food_cost(TravelKind::Travel, explorer.troop_count);
                let stamina_cost = path
                    .steps()
                    .iter()
                    .skip(1)
                    .map(|step| {
                        step.stamina_cost.unwrap_or_else(|| match step.biome {
                            Some(biome) => costs.travel_stamina_cost(biome, explorer.category),
                            None => config.stamina.travel_cost,
                        })
                    })
                    .sum();
                (
                    stamina_cost,
                    per_step.wheat.saturating_mul(steps),
                    per_step.fish.saturating_mul(steps),
                )
            }
        };

        let unit = StateKey::Unit(explorer.id);
        let mut mutations = vec![
            Mutation::new(unit, StateField::Position, FieldValue::Coord(planned.destination)),
            Mutation::new(
                unit,
                StateField::Stamina,
                FieldValue::Stamina(StaminaState::new(
                    stamina.saturating_sub(stamina_cost),
                    armies_tick,
                )),
            ),
            Mutation::new(
                unit,
                StateField::Wheat,
                FieldValue::Amount(food.wheat.saturating_sub(wheat_cost)),
            ),
            Mutation::new(
                unit,
                StateField::Fish,
                FieldValue::Amount(food.fish.saturating_sub(fish_cost)),
            ),
        ];

        if let MoveAction::Explore { .. } = planned.action {
            mutations.extend([
                Mutation::new(
                    unit,
                    StateField::CarriedWeight,
                    FieldValue::Amount(view.carried_kg.saturating_add(costs.explore_reward_weight())),
                ),
                Mutation::new(
                    StateKey::Tile(planned.origin),
                    StateField::TileOccupant,
                    FieldValue::Occupant(None),
                ),
                Mutation::new(
                    StateKey::Tile(planned.destination),
                    StateField::TileOccupant,
                    FieldValue::Occupant(Some(Occupant::new(explorer.id, explorer.owner))),
                ),
            ]);
        }

        mutations
    }
}

/// Reconciles one overlay with the backend's answer
///
/// Dropped without `finish` (the submit future panicked or the task was
/// aborted) it rolls the overlay back and releases the unit.
struct Settlement {
    state: Arc<Mutex<UnitStateStore>>,
    in_flight: Arc<Mutex<AHashSet<EntityId>>>,
    reports: Option<UnboundedSender<MoveReport>>,
    overlay_id: OverlayId,
    action: MoveAction,
    finished: bool,
}

impl Settlement {
    fn finish(&mut self, result: Result<Receipt>) -> MoveOutcome {
        self.finished = true;
        let unit = self.action.unit();
        let overlay_id = self.overlay_id;

        let outcome = {
            let mut state = lock(&self.state);
            let overlays = state.overlays_mut();
            match result {
                Ok(receipt) => {
                    // Position and tiles stay until the sync layer supersedes them
                    overlays.remove_by_category(&overlay_id, FieldCategory::NonVisual);
                    overlays.settle(&overlay_id);
                    tracing::debug!(%unit, %overlay_id, tx = %receipt.transaction, "move confirmed");
                    MoveOutcome::Confirmed(receipt)
                }
                Err(err) => {
                    overlays.remove_all(&overlay_id);
                    tracing::warn!(%unit, %overlay_id, error = %err, "move rejected, overlay rolled back");
                    MoveOutcome::RolledBack(err.to_string())
                }
            }
        };

        lock(&self.in_flight).remove(&unit);

        if let Some(reports) = &self.reports {
            let report = MoveReport {
                unit,
                overlay_id,
                action: self.action.clone(),
                outcome: outcome.clone(),
            };
            if reports.send(report).is_err() {
                tracing::debug!(%unit, "move report receiver dropped");
            }
        }

        outcome
    }
}

impl Drop for Settlement {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(Err(MarchError::Submission(
                "submission aborted before the backend answered".into(),
            )));
        }
    }
}

async fn settle(
    submitter: Arc<dyn Submitter>,
    state: Arc<Mutex<UnitStateStore>>,
    in_flight: Arc<Mutex<AHashSet<EntityId>>>,
    reports: Option<UnboundedSender<MoveReport>>,
    overlay_id: OverlayId,
    action: MoveAction,
) -> MoveOutcome {
    let mut settlement = Settlement {
        state,
        in_flight,
        reports,
        overlay_id,
        action: action.clone(),
        finished: false,
    };
    let result = submitter.submit(action).await;
    settlement.finish(result)
}
