//! Integration tests for evac-sim.

use evac_core::{NodeId, Point, SimConfig};
use evac_network::{NetworkBuilder, NetworkModel};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 1 distance unit per second, one-second ticks: budget = speed.
fn unit_config(speed_mps: f64, seed: u64) -> SimConfig {
    SimConfig {
        seed,
        tick_duration_secs: 1.0,
        speed_mps,
        ..SimConfig::default()
    }
}

/// A ──10── B ──10── C (target) plus an isolated node D.
fn line_abc(capacity: u32) -> (NetworkModel, [NodeId; 4]) {
    let mut b = NetworkBuilder::new();
    let a = b.add_node(Point::new(0.0, 0.0));
    let bb = b.add_node(Point::new(10.0, 0.0));
    let c = b.add_node(Point::new(20.0, 0.0));
    let d = b.add_node(Point::new(0.0, 40.0));
    b.add_edge(a, bb, 10.0);
    b.add_edge(bb, c, 10.0);
    b.add_target(c);
    b.capacity(capacity);
    (b.build().unwrap(), [a, bb, c, d])
}

/// `n × n` street grid with `spacing` metre blocks; exits at two opposite
/// corners.
fn grid(n: u32, spacing: f64, capacity: u32) -> NetworkModel {
    let mut b = NetworkBuilder::with_capacity((n * n) as usize, (2 * n * n) as usize);
    for r in 0..n {
        for c in 0..n {
            b.add_node(Point::new(c as f64 * spacing, r as f64 * spacing));
        }
    }
    for r in 0..n {
        for c in 0..n {
            let id = NodeId(r * n + c);
            if c + 1 < n {
                b.add_edge(id, NodeId(r * n + c + 1), spacing);
            }
            if r + 1 < n {
                b.add_edge(id, NodeId((r + 1) * n + c), spacing);
            }
        }
    }
    b.add_target(NodeId(0));
    b.add_target(NodeId(n * n - 1));
    b.capacity(capacity);
    b.build().unwrap()
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use evac_core::{AgentStatus, Tick};
    use evac_network::DijkstraRouter;

    use super::*;
    use crate::{NoopObserver, SimBuilder, SnapshotCollector};

    #[test]
    fn single_agent_reaches_target_in_two_ticks() {
        let (net, [a, b, c, _]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 7), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let agent = &sim.agents()[0];
        assert_eq!(agent.current_node(), b);
        assert_eq!(agent.status(), AgentStatus::Active);
        assert_eq!(agent.distance_along_edge(), 0.0);

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let agent = &sim.agents()[0];
        assert_eq!(agent.current_node(), c);
        assert_eq!(agent.status(), AgentStatus::Evacuated);
        assert_eq!(sim.completed_at(), Some(Tick(2)));
    }

    #[test]
    fn capacity_race_goes_to_first_activated() {
        for seed in [1, 2, 3, 99] {
            let (net, [a, _, c, _]) = line_abc(1);
            let mut sim = SimBuilder::new(unit_config(10.0, seed), net, DijkstraRouter)
                .agents(vec![a, a])
                .build()
                .unwrap();

            sim.run_ticks(2, &mut NoopObserver).unwrap();
            let order = sim.scheduler().last_order().to_vec();
            let first = &sim.agents()[order[0]];
            let second = &sim.agents()[order[1]];

            assert_eq!(first.status(), AgentStatus::Evacuated, "seed {seed}");
            assert_eq!(first.reroute_count(), 0);
            assert_eq!(second.status(), AgentStatus::Stranded, "seed {seed}");
            assert_eq!(second.reroute_count(), 1);
            assert_eq!(second.current_node(), c);
            assert_eq!(sim.occupancy().occupants(c), Some(1));
        }
    }

    #[test]
    fn isolated_start_is_stranded_without_reroute() {
        let (net, [_, _, _, d]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 0), net, DijkstraRouter)
            .agents(vec![d])
            .build()
            .unwrap();

        let mut collector = SnapshotCollector::new();
        sim.run_ticks(1, &mut collector).unwrap();
        let snap = &collector.snapshots[0];
        assert_eq!(snap.tick, Tick(1));
        assert_eq!(snap.agents[0].status, AgentStatus::Stranded);
        assert_eq!(snap.agents[0].reroute_count, 0);
        assert_eq!(snap.stranded_count, 1);
        assert_eq!(snap.agents[0].current_node, d);
    }

    #[test]
    fn run_stops_five_ticks_after_completion() {
        let (net, [a, ..]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 3), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();

        let mut collector = SnapshotCollector::new();
        let summary = sim.run(1_000, &mut collector).unwrap();

        assert_eq!(summary.completed_at, Some(Tick(2)));
        assert_eq!(summary.ticks_run, 7);
        assert_eq!(collector.snapshots.len(), 7);
        assert_eq!(collector.snapshots[6].tick, Tick(7));
        assert_eq!(collector.summary, Some(summary));
    }

    #[test]
    fn run_stops_at_max_ticks_first() {
        let (net, [a, ..]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 3), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();

        let mut collector = SnapshotCollector::new();
        let summary = sim.run(4, &mut collector).unwrap();
        assert_eq!(summary.ticks_run, 4);
        assert_eq!(collector.snapshots.len(), 4);
    }

    #[test]
    fn never_completing_run_uses_all_ticks() {
        let (net, [a, ..]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(0.0, 3), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        let summary = sim.run(25, &mut NoopObserver).unwrap();
        assert_eq!(summary.ticks_run, 25);
        assert_eq!(summary.completed_at, None);
        assert_eq!(summary.active, 1);
    }

    #[test]
    fn grace_period_follows_config() {
        let (net, [a, ..]) = line_abc(1);
        let config = SimConfig { grace_ticks: 0, ..unit_config(10.0, 3) };
        let mut sim = SimBuilder::new(config, net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        assert_eq!(sim.run(1_000, &mut NoopObserver).unwrap().ticks_run, 2);
    }

    #[test]
    fn no_agents_completes_after_first_tick() {
        let (net, _) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(1.0, 0), net, DijkstraRouter)
            .build()
            .unwrap();
        let summary = sim.run(1_000, &mut NoopObserver).unwrap();
        assert_eq!(summary.completed_at, Some(Tick(1)));
        assert_eq!(summary.ticks_run, 6);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn run_configured_caps_at_config_max_ticks() {
        let (net, [a, ..]) = line_abc(1);
        let config = SimConfig { max_ticks: 12, ..unit_config(0.0, 3) };
        let mut sim = SimBuilder::new(config, net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        let summary = sim.run_configured(&mut NoopObserver).unwrap();
        assert_eq!(summary.ticks_run, 12);
        assert_eq!(summary.completed_at, None);
    }

    #[test]
    fn run_ticks_ignores_grace_rule() {
        let (net, [a, ..]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 3), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        sim.run_ticks(20, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock().current_tick, Tick(20));
    }
}

// ── Properties over a crowded grid ────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use evac_core::AgentStatus;
    use evac_network::DijkstraRouter;

    use super::*;
    use crate::{EvacSim, NoopObserver, SimBuilder, SnapshotCollector};

    const AGENTS: usize = 40;
    const CAPACITY: u32 = 6;

    fn crowded(seed: u64) -> EvacSim<DijkstraRouter> {
        let config = SimConfig { seed, ..SimConfig::default() };
        SimBuilder::new(config, grid(6, 100.0, CAPACITY), DijkstraRouter)
            .random_agents(AGENTS)
            .build()
            .unwrap()
    }

    #[test]
    fn per_tick_invariants_hold() {
        let mut sim = crowded(11);
        let targets = sim.network().targets().len();
        let mut prev: Vec<(AgentStatus, NodeId, u32)> = sim
            .agents()
            .iter()
            .map(|a| (a.status(), a.current_node(), a.reroute_count()))
            .collect();

        for _ in 0..200 {
            sim.run_ticks(1, &mut NoopObserver).unwrap();

            let counts = sim.counts();
            assert_eq!(counts.total(), AGENTS, "conservation");

            for (agent, before) in sim.agents().iter().zip(&prev) {
                // Distance stays strictly inside the current edge.
                if agent.status() == AgentStatus::Active {
                    let next = agent.next_node().expect("active agents are on an edge");
                    let len = sim.network().edge_length(agent.current_node(), next).unwrap();
                    assert!(agent.distance_along_edge() >= 0.0);
                    assert!(agent.distance_along_edge() < len);
                }
                // Terminal states are absorbing and frozen.
                if before.0.is_terminal() {
                    assert_eq!(agent.status(), before.0);
                    assert_eq!(agent.current_node(), before.1);
                }
                // Reroutes only go up, and never past the number of targets.
                assert!(agent.reroute_count() >= before.2);
                assert!(agent.reroute_count() as usize <= targets);
            }

            for (node, occupants) in sim.occupancy().iter() {
                assert!(occupants <= CAPACITY);
                let evacuated_here = sim
                    .agents()
                    .iter()
                    .filter(|a| a.status() == AgentStatus::Evacuated && a.current_node() == node)
                    .count();
                assert_eq!(evacuated_here, occupants as usize);
            }

            prev = sim
                .agents()
                .iter()
                .map(|a| (a.status(), a.current_node(), a.reroute_count()))
                .collect();
        }
    }

    #[test]
    fn overflow_is_stranded_once_every_exit_fills() {
        let mut sim = crowded(5);
        let summary = sim.run(1_000, &mut NoopObserver).unwrap();
        assert!(summary.completed_at.is_some());
        assert_eq!(summary.evacuated, 2 * CAPACITY as usize);
        assert_eq!(summary.stranded, AGENTS - 2 * CAPACITY as usize);
        assert_eq!(summary.active, 0);
    }

    #[test]
    fn same_seed_same_snapshots() {
        let mut a = SnapshotCollector::new();
        let mut b = SnapshotCollector::new();
        crowded(42).run(1_000, &mut a).unwrap();
        crowded(42).run(1_000, &mut b).unwrap();
        assert!(!a.snapshots.is_empty());
        assert_eq!(a.snapshots, b.snapshots);
        assert_eq!(a.summary, b.summary);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn same_seed_same_serialized_snapshots() {
        let mut a = SnapshotCollector::new();
        let mut b = SnapshotCollector::new();
        crowded(8).run(1_000, &mut a).unwrap();
        crowded(8).run(1_000, &mut b).unwrap();
        let ja = serde_json::to_string(&a.snapshots).unwrap();
        let jb = serde_json::to_string(&b.snapshots).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn snapshot_counts_match_agent_statuses() {
        let mut collector = SnapshotCollector::new();
        crowded(3).run(1_000, &mut collector).unwrap();
        for (i, snap) in collector.snapshots.iter().enumerate() {
            assert_eq!(snap.tick.0, i as u64 + 1);
            let evacuated = snap.agents.iter().filter(|a| a.status == AgentStatus::Evacuated).count();
            assert_eq!(snap.evacuated_count, evacuated);
            assert_eq!(snap.counts().total(), AGENTS);
            for a in &snap.agents {
                assert!((0.0..1.0).contains(&a.edge_fraction));
            }
            let admitted: u32 = snap.targets.iter().map(|t| t.occupants).sum();
            assert_eq!(admitted as usize, snap.evacuated_count);
        }
        let last = collector.snapshots.last().unwrap();
        assert!(last.targets.iter().all(|t| t.at_capacity));
    }
}

// ── Snapshot contents ─────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshots {
    use evac_core::{AgentId, AgentStatus, Tick};
    use evac_network::DijkstraRouter;

    use super::*;
    use crate::{SimBuilder, TargetSnapshot};

    #[test]
    fn mid_edge_position_is_resolved() {
        let (net, [a, b, c, _]) = line_abc(2);
        let mut sim = SimBuilder::new(unit_config(2.5, 0), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        sim.run_ticks(1, &mut crate::NoopObserver).unwrap();

        let snap = sim.snapshot().unwrap();
        assert_eq!(snap.tick, Tick(1));
        let agent = &snap.agents[0];
        assert_eq!(agent.id, AgentId(0));
        assert_eq!(agent.current_node, a);
        assert_eq!(agent.next_node, Some(b));
        assert_eq!(agent.edge_fraction, 0.25);
        assert_eq!(agent.position, Point::new(2.5, 0.0));
        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(
            snap.targets,
            vec![TargetSnapshot { node: c, occupants: 0, at_capacity: false }]
        );
    }

    #[test]
    fn evacuated_agent_sits_on_target() {
        let (net, [a, _, c, _]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(100.0, 0), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        sim.run_ticks(1, &mut crate::NoopObserver).unwrap();
        let snap = sim.snapshot().unwrap();
        assert_eq!(snap.agents[0].next_node, None);
        assert_eq!(snap.agents[0].position, Point::new(20.0, 0.0));
        assert_eq!(snap.agents[0].edge_fraction, 0.0);
        assert_eq!(
            snap.targets,
            vec![TargetSnapshot { node: c, occupants: 1, at_capacity: true }]
        );
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use evac_agent::AgentError;
    use evac_network::{DijkstraRouter, NetworkError};

    use super::*;
    use crate::{SimBuilder, SimError};

    #[test]
    fn default_speed_applied() {
        let (net, [a, b, ..]) = line_abc(1);
        let sim = SimBuilder::new(SimConfig::default(), net, DijkstraRouter)
            .agents(vec![a, b])
            .build()
            .unwrap();
        assert_eq!(sim.agents().len(), 2);
        assert!(sim.agents().iter().all(|ag| ag.speed_mps() == 1.4));
    }

    #[test]
    fn per_agent_speeds() {
        let (net, [a, b, ..]) = line_abc(1);
        let sim = SimBuilder::new(SimConfig::default(), net, DijkstraRouter)
            .agents(vec![a, b])
            .speeds(vec![0.5, 3.0])
            .build()
            .unwrap();
        assert_eq!(sim.agents()[1].speed_mps(), 3.0);
    }

    #[test]
    fn speed_count_mismatch_errors() {
        let (net, [a, ..]) = line_abc(1);
        let result = SimBuilder::new(SimConfig::default(), net, DijkstraRouter)
            .agents(vec![a, a, a])
            .speeds(vec![1.0; 2])
            .build();
        assert!(matches!(
            result,
            Err(SimError::AgentCountMismatch { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn negative_speed_rejected() {
        let (net, [a, ..]) = line_abc(1);
        let result = SimBuilder::new(SimConfig::default(), net, DijkstraRouter)
            .agents(vec![a])
            .speeds(vec![-1.0])
            .build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn invalid_config_rejected() {
        let (net, [a, ..]) = line_abc(1);
        let config = SimConfig { tick_duration_secs: 0.0, ..SimConfig::default() };
        let result = SimBuilder::new(config, net, DijkstraRouter).agents(vec![a]).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn unknown_start_node_rejected() {
        let (net, _) = line_abc(1);
        let result = SimBuilder::new(SimConfig::default(), net, DijkstraRouter)
            .agents(vec![NodeId(42)])
            .build();
        assert!(matches!(
            result,
            Err(SimError::Agent(AgentError::Network(NetworkError::NodeNotFound(NodeId(42)))))
        ));
    }

    #[test]
    fn random_placement_is_seeded() {
        let starts = |seed| {
            let config = SimConfig { seed, ..SimConfig::default() };
            SimBuilder::new(config, grid(5, 50.0, 10), DijkstraRouter)
                .random_agents(30)
                .build()
                .unwrap()
                .agents()
                .iter()
                .map(|a| a.route().nodes[0])
                .collect::<Vec<_>>()
        };
        let a = starts(17);
        assert_eq!(a.len(), 30);
        assert!(a.iter().all(|n| n.index() < 25));
        assert_eq!(a, starts(17));
    }

    #[test]
    fn shared_network_accepted() {
        let (net, [a, ..]) = line_abc(1);
        let shared = std::sync::Arc::new(net);
        let sim = SimBuilder::new(SimConfig::default(), std::sync::Arc::clone(&shared), DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        assert_eq!(sim.network().node_count(), shared.node_count());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer {
    use evac_core::Tick;
    use evac_network::DijkstraRouter;

    use super::*;
    use crate::{RunSummary, SimBuilder, SimObserver, TickSnapshot};

    #[derive(Default)]
    struct Recorder {
        starts:    Vec<Tick>,
        snapshots: usize,
        ended:     Vec<RunSummary>,
    }

    impl SimObserver for Recorder {
        fn on_tick_start(&mut self, tick: Tick) {
            self.starts.push(tick);
        }
        fn on_snapshot(&mut self, _snapshot: &TickSnapshot) {
            self.snapshots += 1;
        }
        fn on_sim_end(&mut self, summary: &RunSummary) {
            self.ended.push(*summary);
        }
    }

    #[test]
    fn hooks_called_in_order() {
        let (net, [a, ..]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 0), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(1_000, &mut rec).unwrap();

        assert_eq!(rec.starts, (1..=7).map(Tick).collect::<Vec<_>>());
        assert_eq!(rec.snapshots, 7);
        assert_eq!(rec.ended, vec![summary]);
    }

    #[test]
    fn run_ticks_does_not_end_sim() {
        let (net, [a, ..]) = line_abc(1);
        let mut sim = SimBuilder::new(unit_config(10.0, 0), net, DijkstraRouter)
            .agents(vec![a])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(3, &mut rec).unwrap();
        assert_eq!(rec.snapshots, 3);
        assert!(rec.ended.is_empty());
    }
}

// ── Replicates ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod batch {
    use std::sync::Arc;

    use evac_network::DijkstraRouter;

    use super::*;
    use crate::run_replicates;

    #[test]
    fn one_summary_per_seed() {
        let net = Arc::new(grid(5, 80.0, 4));
        let starts: Vec<NodeId> = (0..20).map(|i| NodeId(i % 25)).collect();
        let config = SimConfig::default();

        let summaries =
            run_replicates(Arc::clone(&net), &starts, &config, &DijkstraRouter, &[1, 2, 3], 500)
                .unwrap();
        assert_eq!(summaries.len(), 3);
        for s in &summaries {
            assert_eq!(s.total, 20);
            assert_eq!(s.evacuated, 8);
            assert_eq!(s.stranded, 12);
        }
    }

    #[test]
    fn replicates_are_reproducible() {
        let net = Arc::new(grid(4, 60.0, 3));
        let starts: Vec<NodeId> = (0..12).map(|i| NodeId((i * 5) % 16)).collect();
        let config = SimConfig::default();

        let a = run_replicates(Arc::clone(&net), &starts, &config, &DijkstraRouter, &[9, 9], 500)
            .unwrap();
        assert_eq!(a[0], a[1]);
        let b = run_replicates(net, &starts, &config, &DijkstraRouter, &[9], 500).unwrap();
        assert_eq!(a[0], b[0]);
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use evac_agent::{Agent, TargetOccupancy};
    use evac_core::{AgentId, SimRng};
    use evac_network::DijkstraRouter;

    use super::*;
    use crate::{Scheduler, TickActivity};

    fn scheduler(net: &NetworkModel, n: u32, seed: u64) -> Scheduler {
        let agents = (0..n)
            .map(|i| Agent::new(AgentId(i), NodeId(i % 16), 1.0, net, &DijkstraRouter).unwrap())
            .collect();
        Scheduler::new(agents, SimRng::new(seed))
    }

    #[test]
    fn order_is_a_seeded_permutation() {
        let net = grid(4, 10.0, 100);
        let config = SimConfig { tick_duration_secs: 1.0, ..SimConfig::default() };
        let mut a = scheduler(&net, 12, 5);
        let mut b = scheduler(&net, 12, 5);
        assert_eq!(a.last_order(), (0..12).collect::<Vec<_>>().as_slice());

        let mut occ_a = TargetOccupancy::new(net.targets());
        let mut occ_b = TargetOccupancy::new(net.targets());
        for _ in 0..3 {
            a.tick(&config, &net, &DijkstraRouter, &mut occ_a).unwrap();
            b.tick(&config, &net, &DijkstraRouter, &mut occ_b).unwrap();
            assert_eq!(a.last_order(), b.last_order());

            let mut sorted = a.last_order().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..12).collect::<Vec<_>>());
        }
    }

    #[test]
    fn activity_tallies_outcomes() {
        let net = grid(4, 10.0, 100);
        let config = SimConfig { tick_duration_secs: 1.0, speed_mps: 1_000.0, ..SimConfig::default() };
        let agents = (0..3)
            .map(|i| Agent::new(AgentId(i), NodeId(5), 1_000.0, &net, &DijkstraRouter).unwrap())
            .collect();
        let mut s = Scheduler::new(agents, SimRng::new(0));
        let mut occ = TargetOccupancy::new(net.targets());

        let first = s.tick(&config, &net, &DijkstraRouter, &mut occ).unwrap();
        assert_eq!(first, TickActivity { moving: 0, evacuated: 3, stranded: 0 });
        let second = s.tick(&config, &net, &DijkstraRouter, &mut occ).unwrap();
        assert_eq!(second, TickActivity::default());
        assert_eq!(s.len(), 3);
    }
}
