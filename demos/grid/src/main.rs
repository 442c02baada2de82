//! evac-grid — evacuation of a synthetic street grid.
//!
//! Places random evacuees on a 24 × 24 block grid with a flooded strip through
//! its middle, sends them to four capacity-limited exits, and reports how many
//! got out.  A handful of extra seeds are then run as replicates to show how
//! much the outcome depends on activation order.
//!
//! ```text
//! cargo run -p evac-grid                      # defaults
//! cargo run -p evac-grid -- config.json       # partial SimConfig in JSON
//! RUST_LOG=evac_sim=debug cargo run -p evac-grid
//! ```

mod network;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use evac_core::{SimConfig, Tick};
use evac_network::DijkstraRouter;
use evac_sim::{RunSummary, SimBuilder, SimObserver, TickSnapshot, run_replicates};

use network::{build_grid, flood_band};

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_SIZE:       u32   = 24;
const BLOCK_METRES:    f64   = 80.0;
const AGENT_COUNT:     usize = 1_200;
const EXIT_CAPACITY:   u32   = 250;
const SEED:            u64   = 42;
const PROGRESS_EVERY:  u64   = 5;
const REPLICATE_SEEDS: [u64; 4] = [1, 2, 3, 4];

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs a progress line every few ticks and remembers the last snapshot.
struct Progress {
    every: u64,
    last:  Option<TickSnapshot>,
}

impl SimObserver for Progress {
    fn on_snapshot(&mut self, snapshot: &TickSnapshot) {
        if snapshot.tick.0 % self.every == 0 {
            info!(
                tick      = snapshot.tick.0,
                evacuated = snapshot.evacuated_count,
                stranded  = snapshot.stranded_count,
                active    = snapshot.active_count,
                "progress"
            );
        }
        self.last = Some(snapshot.clone());
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        if let Some(done) = summary.completed_at {
            info!(tick = done.0, "every evacuee reached a terminal state");
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Configuration: optional JSON file, missing fields fall back to defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str::<SimConfig>(&text)
                .with_context(|| format!("parsing config {path}"))?
        }
        None => SimConfig { seed: SEED, ..SimConfig::default() },
    };
    config.validate()?;

    // 2. Network with the flooded strip removed.
    let extent = (GRID_SIZE - 1) as f64 * BLOCK_METRES;
    let (network, removed) =
        build_grid(GRID_SIZE, BLOCK_METRES, flood_band(extent), EXIT_CAPACITY)?;
    let network = Arc::new(network);
    info!(
        nodes    = network.node_count(),
        segments = network.edge_count(),
        removed,
        exits    = network.targets().len(),
        capacity = EXIT_CAPACITY,
        "street grid ready"
    );

    // 3. Build and run the main simulation.
    let mut sim = SimBuilder::new(config.clone(), Arc::clone(&network), DijkstraRouter)
        .random_agents(AGENT_COUNT)
        .build()?;
    let starts: Vec<_> = sim.agents().iter().map(|a| a.route().nodes[0]).collect();

    let mut progress = Progress { every: PROGRESS_EVERY, last: None };
    let t0 = Instant::now();
    let summary = sim.run_configured(&mut progress)?;
    let elapsed = t0.elapsed();

    println!();
    println!(
        "Simulated {} ({} ticks) in {:.3} s",
        sim.clock(),
        summary.ticks_run,
        elapsed.as_secs_f64()
    );
    println!(
        "  evacuated {:>5}   stranded {:>5}   still moving {:>5}   of {}",
        summary.evacuated, summary.stranded, summary.active, summary.total
    );
    if let Some(done) = summary.completed_at {
        let minutes = done.since(Tick::ZERO) as f64 * config.tick_duration_secs / 60.0;
        println!("  everyone settled after {done} (~{minutes:.0} min)");
    }
    println!();

    // 4. Exit occupancy table.
    if let Some(last) = &progress.last {
        println!("{:<8} {:<20} {:>9} {:>6}", "Exit", "Position", "Occupants", "Full");
        println!("{}", "-".repeat(46));
        for t in &last.targets {
            let pos = network.node_pos(t.node)?;
            println!(
                "{:<8} {:<20} {:>9} {:>6}",
                t.node.to_string(),
                pos.to_string(),
                t.occupants,
                if t.at_capacity { "yes" } else { "no" },
            );
        }
        println!();
    }

    // 5. Replicates: same starts, different activation orders.
    let t0 = Instant::now();
    let replicates = run_replicates(
        Arc::clone(&network),
        &starts,
        &config,
        &DijkstraRouter,
        &REPLICATE_SEEDS,
        config.max_ticks,
    )?;
    println!(
        "{} replicates in {:.3} s",
        replicates.len(),
        t0.elapsed().as_secs_f64()
    );
    for (seed, r) in REPLICATE_SEEDS.iter().zip(&replicates) {
        println!(
            "  seed {seed:<4} evacuated {:>5}  stranded {:>5}  ticks {:>4}",
            r.evacuated, r.stranded, r.ticks_run
        );
    }

    Ok(())
}
