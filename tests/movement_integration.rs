//! Integration tests for plan -> move -> re-plan
//!
//! The executor applies its overlay before the backend answers; a re-plan
//! issued in between must start from the speculative position and see the
//! speculative reserves.

use std::sync::{Arc, PoisonError};

use frontier_march::campaign::{
    ActionType, ArmyPlanner, Biome, ExploredMap, Explorer, FoodLedger, FoodReserves, HexCoord,
    OccupancyMaps, Occupant, StaticLedger,
};
use frontier_march::core::types::{EntityId, OwnerId, TroopCategory};
use frontier_march::core::GameConfig;
use frontier_march::movement::{MockSubmitter, MoveAction, MoveOutcome, MovementExecutor};
use frontier_march::overlay::{FieldValue, SpeculativeLedger, StateField, StateKey};
use tokio::runtime::Handle;

const ME: OwnerId = OwnerId(1);

fn grassland(radius: i64) -> ExploredMap {
    let origin = HexCoord::new(0, 0);
    ExploredMap::generate_simple(origin, radius, 0)
        .iter()
        .map(|(hex, _)| (*hex, Biome::Grassland))
        .collect()
}

struct World {
    config: GameConfig,
    explored: ExploredMap,
    occupancy: OccupancyMaps,
    ledger: Arc<StaticLedger>,
    scout: Explorer,
    rider: Explorer,
}

fn world() -> World {
    let scout = Explorer::new(EntityId(1), ME, TroopCategory::Knight, HexCoord::new(0, 0))
        .with_stamina(120, 0);
    let rider = Explorer::new(EntityId(2), ME, TroopCategory::Crossbowman, HexCoord::new(0, 3))
        .with_stamina(120, 0);
    let occupancy = OccupancyMaps::new()
        .with_army(scout.coord, Occupant::new(scout.id, ME))
        .with_army(rider.coord, Occupant::new(rider.id, ME));
    let ledger = StaticLedger::new()
        .with(scout.id, FoodReserves::new(20, 20))
        .with(rider.id, FoodReserves::new(20, 20));

    World {
        config: GameConfig::default(),
        explored: grassland(6),
        occupancy,
        ledger: Arc::new(ledger),
        scout,
        rider,
    }
}

fn executor(world: &World, mock: &MockSubmitter) -> MovementExecutor {
    MovementExecutor::new(
        Arc::new(world.config.clone()),
        Arc::new(mock.clone()),
        world.ledger.clone(),
        Handle::current(),
    )
}

#[tokio::test]
async fn test_replan_starts_from_speculative_position() {
    let world = world();
    let mock = MockSubmitter::gated();
    let executor = executor(&world, &mock);

    let paths = ArmyPlanner::new(&world.config, &world.scout, world.ledger.as_ref())
        .find_action_paths(&world.occupancy, &world.explored, 0, 0, ME, None);
    let target = HexCoord::new(2, 0);
    let path = paths.get(&target).expect("two hexes east is reachable").clone();
    assert_eq!(path.hops(), 2);

    let ticket = executor.move_army(&world.scout, &path, true, 0, 0).unwrap();
    assert_eq!(
        ticket.action,
        MoveAction::Travel {
            unit: world.scout.id,
            directions: path
                .hexes()
                .collect::<Vec<_>>()
                .windows(2)
                .filter_map(|p| p[0].direction_to(&p[1]))
                .collect(),
        }
    );

    // Backend has not answered yet
    let state = executor.state();
    {
        let state = state.lock().unwrap_or_else(PoisonError::into_inner);
        let view = state.explorer_view(&world.scout);
        assert_eq!(view.coord, target);
        assert_eq!(view.stamina.amount, 80);

        let ledger = SpeculativeLedger::new(world.ledger.as_ref(), &state);
        assert_eq!(ledger.food(world.scout.id, 0), FoodReserves::new(18, 18));

        let replanned = ArmyPlanner::new(&world.config, &view, &ledger).find_action_paths(
            &world.occupancy,
            &world.explored,
            0,
            0,
            ME,
            Some(view.coord),
        );
        assert!(!replanned.is_empty());
        for (hex, path) in replanned.iter() {
            assert_eq!(path.origin(), Some(target));
            assert!(path.total_stamina() <= 80);
            assert_ne!(*hex, target);
        }
        // The old hex is reachable again: the stale army there is the scout itself
        assert_eq!(
            replanned.get(&world.scout.coord).and_then(|p| p.action()),
            Some(ActionType::Move)
        );
    }

    mock.release();
    assert!(ticket.outcome().await.is_confirmed());
}

#[tokio::test]
async fn test_moves_of_different_units_are_independent() {
    let world = world();
    let mock = MockSubmitter::new();
    let executor = executor(&world, &mock);

    let scout_paths = ArmyPlanner::new(&world.config, &world.scout, world.ledger.as_ref())
        .find_action_paths(&world.occupancy, &world.explored, 0, 0, ME, None);
    let rider_paths = ArmyPlanner::new(&world.config, &world.rider, world.ledger.as_ref())
        .find_action_paths(&world.occupancy, &world.explored, 0, 0, ME, None);

    let scout_to = HexCoord::new(1, 0);
    let rider_to = HexCoord::new(0, 4);
    let first = executor
        .move_army(&world.scout, scout_paths.get(&scout_to).unwrap(), true, 0, 0)
        .unwrap();
    let second = executor
        .move_army(&world.rider, rider_paths.get(&rider_to).unwrap(), true, 0, 0)
        .unwrap();
    assert_ne!(first.overlay_id, second.overlay_id);

    mock.set_failing(true);
    let (a, b) = tokio::join!(first.outcome(), second.outcome());
    assert!(matches!(a, MoveOutcome::RolledBack(_)));
    assert!(matches!(b, MoveOutcome::RolledBack(_)));

    let state = executor.state();
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    assert_eq!(state.explorer_view(&world.scout), world.scout);
    assert_eq!(state.explorer_view(&world.rider), world.rider);
    assert_eq!(mock.submitted().len(), 2);
}

#[tokio::test]
async fn test_sync_supersedes_settled_position() {
    let world = world();
    let mock = MockSubmitter::new();
    let executor = executor(&world, &mock);

    let paths = ArmyPlanner::new(&world.config, &world.scout, world.ledger.as_ref())
        .find_action_paths(&world.occupancy, &world.explored, 0, 0, ME, None);
    let target = HexCoord::new(1, 1);
    let ticket = executor
        .move_army(&world.scout, paths.get(&target).unwrap(), true, 0, 0)
        .unwrap();
    let overlay_id = ticket.overlay_id;
    assert!(ticket.outcome().await.is_confirmed());

    let state = executor.state();
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    assert!(state.overlays().contains(&overlay_id));
    assert_eq!(state.position(world.scout.id), Some(target));

    state.overlays_mut().supersede(
        StateKey::Unit(world.scout.id),
        StateField::Position,
        FieldValue::Coord(target),
    );
    assert!(!state.overlays().contains(&overlay_id));
    assert_eq!(state.position(world.scout.id), Some(target));
    assert!(!state
        .overlays()
        .is_speculative(&StateKey::Unit(world.scout.id), &StateField::Position));
}

#[tokio::test]
async fn test_explore_rejected_when_not_adjacent_single_hop() {
    let world = world();
    let mock = MockSubmitter::new();
    let executor = executor(&world, &mock);

    let paths = ArmyPlanner::new(&world.config, &world.scout, world.ledger.as_ref())
        .find_action_paths(&world.occupancy, &world.explored, 0, 0, ME, None);
    let two_hops = paths.get(&HexCoord::new(2, 0)).unwrap();

    assert!(executor.move_army(&world.scout, two_hops, false, 0, 0).is_err());
    assert!(!executor.is_in_flight(world.scout.id));
}
