//! The `EvacSim` struct and its tick loop.

use std::sync::Arc;

use evac_agent::{Agent, TargetOccupancy};
use evac_core::{AgentStatus, SimClock, SimConfig, Tick};
use evac_network::{NetworkModel, Router};
use tracing::{debug, info};

use crate::scheduler::Scheduler;
use crate::snapshot::{AgentSnapshot, RunSummary, TargetSnapshot, TickCounts, TickSnapshot};
use crate::{SimObserver, SimResult};

/// The evacuation simulation runner.
///
/// Each tick:
///
/// 1. **Activate**: the [`Scheduler`] shuffles the agents with the
///    simulation's seeded RNG and steps them one after another.  Target
///    occupancy is claimed inside each step, so arrivals within a tick are
///    resolved strictly in activation order.
/// 2. **Count**: evacuated / stranded / active totals are recomputed.
/// 3. **Publish**: a [`TickSnapshot`] goes to the observer.
///
/// [`run`](Self::run) stops `grace_ticks` ticks after the tick in which the
/// last agent became terminal, or after `max_ticks`, whichever comes first.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct EvacSim<R: Router> {
    config:       SimConfig,
    clock:        SimClock,
    network:      Arc<NetworkModel>,
    router:       R,
    scheduler:    Scheduler,
    occupancy:    TargetOccupancy,
    /// First tick after which every agent was terminal.
    completed_at: Option<Tick>,
}

impl<R: Router> EvacSim<R> {
    pub(crate) fn from_parts(
        config:    SimConfig,
        network:   Arc<NetworkModel>,
        router:    R,
        scheduler: Scheduler,
    ) -> Self {
        let occupancy = TargetOccupancy::new(network.targets());
        Self {
            clock: config.make_clock(),
            config,
            network,
            router,
            scheduler,
            occupancy,
            completed_at: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[inline]
    pub fn network(&self) -> &NetworkModel {
        &self.network
    }

    #[inline]
    pub fn router(&self) -> &R {
        &self.router
    }

    /// All agents, indexed by `AgentId`.
    #[inline]
    pub fn agents(&self) -> &[Agent] {
        self.scheduler.agents()
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[inline]
    pub fn occupancy(&self) -> &TargetOccupancy {
        &self.occupancy
    }

    #[inline]
    pub fn completed_at(&self) -> Option<Tick> {
        self.completed_at
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the grace period after completion has elapsed, or until
    /// `max_ticks` ticks have been executed by this call.
    ///
    /// Produces one snapshot per executed tick.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    ///
    /// # Errors
    ///
    /// Fatal engine errors only (a route that disagrees with the network).
    /// Agents that cannot reach a target are reported as stranded, not as
    /// errors.
    pub fn run<O: SimObserver>(&mut self, max_ticks: u64, observer: &mut O) -> SimResult<RunSummary> {
        info!(
            agents   = self.scheduler.len(),
            targets  = self.network.targets().len(),
            capacity = self.network.targets().capacity(),
            seed     = self.config.seed,
            max_ticks,
            "evacuation run starting"
        );

        for _ in 0..max_ticks {
            if self.grace_elapsed() {
                break;
            }
            self.advance(observer)?;
        }

        let summary = self.summary();
        info!(
            ticks     = summary.ticks_run,
            evacuated = summary.evacuated,
            stranded  = summary.stranded,
            active    = summary.active,
            elapsed   = %self.clock,
            "evacuation run finished"
        );
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    /// [`run`](Self::run) capped at the config's `max_ticks`.
    pub fn run_configured<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        self.run(self.config.max_ticks, observer)
    }

    /// Run exactly `n` ticks from the current position, ignoring the grace
    /// rule.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.advance(observer)?;
        }
        Ok(())
    }

    /// Current status totals.
    pub fn counts(&self) -> TickCounts {
        let mut counts = TickCounts::default();
        for agent in self.scheduler.agents() {
            match agent.status() {
                AgentStatus::Active => counts.active += 1,
                AgentStatus::Evacuated => counts.evacuated += 1,
                AgentStatus::Stranded => counts.stranded += 1,
            }
        }
        counts
    }

    /// The current state as a snapshot stamped with the clock's tick.
    pub fn snapshot(&self) -> SimResult<TickSnapshot> {
        let agents = self
            .scheduler
            .agents()
            .iter()
            .map(|a| -> SimResult<AgentSnapshot> {
                Ok(AgentSnapshot {
                    id:            a.id(),
                    current_node:  a.current_node(),
                    next_node:     a.next_node(),
                    edge_fraction: a.edge_fraction(&self.network)?,
                    position:      a.position(&self.network)?,
                    status:        a.status(),
                    reroute_count: a.reroute_count(),
                })
            })
            .collect::<SimResult<Vec<_>>>()?;

        let capacity = self.occupancy.capacity();
        let targets = self
            .occupancy
            .iter()
            .map(|(node, occupants)| TargetSnapshot {
                node,
                occupants,
                at_capacity: occupants >= capacity,
            })
            .collect();

        let counts = self.counts();
        Ok(TickSnapshot {
            tick: self.clock.current_tick,
            agents,
            evacuated_count: counts.evacuated,
            stranded_count: counts.stranded,
            active_count: counts.active,
            targets,
        })
    }

    /// Totals as of now.
    pub fn summary(&self) -> RunSummary {
        let counts = self.counts();
        RunSummary {
            ticks_run:    self.clock.current_tick.0,
            completed_at: self.completed_at,
            evacuated:    counts.evacuated,
            stranded:     counts.stranded,
            active:       counts.active,
            total:        counts.total(),
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn grace_elapsed(&self) -> bool {
        self.completed_at
            .is_some_and(|done| self.clock.current_tick.since(done) >= self.config.grace_ticks)
    }

    fn advance<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        observer.on_tick_start(self.clock.current_tick + 1);

        let activity = self.scheduler.tick(
            &self.config,
            &self.network,
            &self.router,
            &mut self.occupancy,
        )?;
        let now = self.clock.advance();

        let counts = self.counts();
        debug!(
            tick      = now.0,
            evacuated = counts.evacuated,
            stranded  = counts.stranded,
            active    = counts.active,
            newly_evacuated = activity.evacuated,
            newly_stranded  = activity.stranded,
            "tick complete"
        );

        if self.completed_at.is_none() && counts.all_terminal() {
            self.completed_at = Some(now);
            info!(
                tick        = now.0,
                evacuated   = counts.evacuated,
                stranded    = counts.stranded,
                grace_ticks = self.config.grace_ticks,
                "all agents terminal, grace period started"
            );
        }

        if observer.wants_snapshots() {
            observer.on_snapshot(&self.snapshot()?);
        }
        Ok(())
    }
}
