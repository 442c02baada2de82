//! Simulation observer trait — the reporting side of the engine.

use evac_core::Tick;

use crate::snapshot::{RunSummary, TickSnapshot};

/// Callbacks invoked by [`EvacSim::run`][crate::EvacSim::run] and
/// [`EvacSim::run_ticks`][crate::EvacSim::run_ticks].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_snapshot(&mut self, s: &TickSnapshot) {
///         println!("{}: {} evacuated, {} stranded", s.tick, s.evacuated_count, s.stranded_count);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before tick `tick` is processed (`tick` is the number the
    /// following snapshot will carry).
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Whether the simulation should assemble a [`TickSnapshot`] after each
    /// tick.  Return `false` to skip the per-agent allocation entirely.
    fn wants_snapshots(&self) -> bool {
        true
    }

    /// Called after every tick with the full post-tick state.
    fn on_snapshot(&mut self, _snapshot: &TickSnapshot) {}

    /// Called once when `run` stops.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {
    fn wants_snapshots(&self) -> bool {
        false
    }
}

/// Keeps every snapshot in memory.
#[derive(Default)]
pub struct SnapshotCollector {
    pub snapshots: Vec<TickSnapshot>,
    pub summary:   Option<RunSummary>,
}

impl SnapshotCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimObserver for SnapshotCollector {
    fn on_snapshot(&mut self, snapshot: &TickSnapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        self.summary = Some(*summary);
    }
}
