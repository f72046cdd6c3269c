//! Frontier March - demo entry point
//!
//! Generates an explored map around a sample explorer, prints the hexes it
//! can act on, then moves it through the mock backend and re-plans from the
//! speculative position.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError};

use clap::Parser;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

use frontier_march::campaign::{
    ActionPathSet, ActionType, ArmyPlanner, ExploredMap, Explorer, FoodLedger, FoodReserves,
    HexCoord, OccupancyMaps, Occupant, StaticLedger,
};
use frontier_march::core::types::{EntityId, OwnerId, TroopCategory};
use frontier_march::core::{GameConfig, Result};
use frontier_march::movement::{MockSubmitter, MoveOutcome, MovementExecutor};
use frontier_march::overlay::{SpeculativeLedger, UnitStateStore};

/// Plan and execute one speculative move on a generated map
#[derive(Parser, Debug)]
#[command(name = "frontier-march")]
#[command(about = "Plan action paths for an explorer and submit one move")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for the map and unit placement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Radius of the explored disc around the explorer
    #[arg(long, default_value_t = 6)]
    radius: i64,

    /// Starting stamina of the explorer
    #[arg(long, default_value_t = 80)]
    stamina: u64,

    /// Make the mock backend reject the move
    #[arg(long, default_value_t = false)]
    fail: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontier_march=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let center = config.map.center;

    let player = OwnerId(1);
    let origin = HexCoord::from_normalized(0, 0, center);
    let explored = ExploredMap::generate_simple(origin, args.radius, args.seed);
    let explorer = Explorer::new(EntityId(1), player, TroopCategory::Knight, origin)
        .with_stamina(args.stamina, 0);

    let mut occupancy = OccupancyMaps::new().with_army(origin, Occupant::new(explorer.id, player));
    let mut candidates: Vec<HexCoord> = explored
        .iter()
        .map(|(hex, _)| *hex)
        .filter(|hex| *hex != origin)
        .collect();
    candidates.sort();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    for (i, hex) in candidates.choose_multiple(&mut rng, 4).enumerate() {
        let owner = if i == 0 { player } else { OwnerId(2) };
        occupancy.place_army(*hex, Occupant::new(EntityId(10 + i as u32), owner));
    }

    let ledger = Arc::new(StaticLedger::new().with(explorer.id, FoodReserves::new(500, 500)));

    tracing::info!(seed = args.seed, hexes = explored.len(), "map generated");

    let paths = ArmyPlanner::new(&config, &explorer, ledger.as_ref())
        .find_action_paths(&occupancy, &explored, 0, 0, player, None);
    print_paths("Reachable", &paths, center);

    let Some(path) = paths
        .iter()
        .filter(|(_, path)| path.action() == Some(ActionType::Move))
        .max_by_key(|(hex, path)| (path.hops(), **hex))
        .map(|(_, path)| path.clone())
    else {
        println!("Nothing to move to.");
        return Ok(());
    };

    let submitter = if args.fail {
        MockSubmitter::failing()
    } else {
        MockSubmitter::new()
    };
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let executor = MovementExecutor::new(
        Arc::new(config.clone()),
        Arc::new(submitter),
        ledger.clone(),
        Handle::current(),
    )
    .with_reports(tx);

    let ticket = executor.move_army(&explorer, &path, true, 0, 0)?;
    let state = executor.state();
    {
        let state = state.lock().unwrap_or_else(PoisonError::into_inner);
        print_unit("Speculative", &state, &explorer, ledger.as_ref(), center);
    }

    match ticket.outcome().await {
        MoveOutcome::Confirmed(receipt) => println!("Confirmed by backend ({})", receipt.transaction),
        MoveOutcome::RolledBack(reason) => println!("Rolled back: {reason}"),
    }
    if let Some(report) = rx.recv().await {
        tracing::info!(unit = %report.unit, overlay = %report.overlay_id, "move settled");
    }

    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    print_unit("Settled", &state, &explorer, ledger.as_ref(), center);

    let view = state.explorer_view(&explorer);
    let occupancy = state.occupancy_view(&occupancy);
    let speculative = SpeculativeLedger::new(ledger.as_ref(), &state);
    let replanned = ArmyPlanner::new(&config, &view, &speculative).find_action_paths(
        &occupancy,
        &explored,
        0,
        0,
        player,
        Some(view.coord),
    );
    print_paths("Re-planned", &replanned, center);

    Ok(())
}

fn print_paths(label: &str, paths: &ActionPathSet, center: i64) {
    println!("\n{label}: {} hexes", paths.len());
    for highlighted in paths.highlighted() {
        let cost = paths
            .get(&highlighted.hex)
            .map(|p| p.total_stamina())
            .unwrap_or_default();
        println!(
            "  {:<14} {:<8} stamina {}",
            highlighted.hex.normalized(center).to_string(),
            format!("{:?}", highlighted.action),
            cost
        );
    }
}

fn print_unit(
    label: &str,
    state: &UnitStateStore,
    explorer: &Explorer,
    ledger: &StaticLedger,
    center: i64,
) {
    let view = state.explorer_view(explorer);
    let food = SpeculativeLedger::new(ledger, state).food(explorer.id, 0);
    println!(
        "\n{label}: {} at {}, stamina {}, wheat {}, fish {}",
        view.id,
        view.coord.normalized(center),
        view.stamina.amount,
        food.wheat,
        food.fish
    );
}
