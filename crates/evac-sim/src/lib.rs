//! `evac-sim` — scheduler and simulation core for the evac engine.
//!
//! # Tick loop
//!
//! ```text
//! loop:
//!   ① Shuffle  — seeded permutation of all agents (reset to id order first).
//!   ② Step     — Agent::step for each agent in that order, one at a time.
//!                Arrivals claim target capacity inside their own step.
//!   ③ Count    — evacuated + stranded + active == total.
//!   ④ Publish  — TickSnapshot to the observer (1-based tick number).
//!   ⑤ Stop     — grace_ticks after the first all-terminal tick, or at
//!                max_ticks.
//! ```
//!
//! A single simulation never runs agents in parallel: the capacity check and
//! claim must happen in activation order for results to be reproducible.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Runs [`run_replicates`] on Rayon's thread pool.           |
//! | `fx-hash`  | FxHash for the target lookup in `evac-network`.           |
//! | `serde`    | `Serialize`/`Deserialize` on snapshots and summaries.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use evac_core::SimConfig;
//! use evac_network::DijkstraRouter;
//! use evac_sim::{SimBuilder, SnapshotCollector};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), network, DijkstraRouter)
//!     .random_agents(500)
//!     .build()?;
//! let mut collector = SnapshotCollector::new();
//! let summary = sim.run(1_000, &mut collector)?;
//! ```

pub mod batch;
pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod sim;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use batch::run_replicates;
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, SnapshotCollector};
pub use scheduler::{Scheduler, TickActivity};
pub use sim::EvacSim;
pub use snapshot::{AgentSnapshot, RunSummary, TargetSnapshot, TickCounts, TickSnapshot};
