//! Fluent builder for constructing an [`EvacSim`].

use std::sync::Arc;

use evac_agent::Agent;
use evac_core::{validate_speed, AgentId, NodeId, SimConfig, SimRng};
use evac_network::{NetworkModel, Router};

use crate::scheduler::Scheduler;
use crate::{EvacSim, SimError, SimResult};

/// RNG stream used for random start placement.  Activation order uses the
/// plain seed, so adding or removing random placement never changes it.
const PLACEMENT_STREAM: u64 = 1;

enum Starts {
    Nodes(Vec<NodeId>),
    Random(usize),
}

/// Fluent builder for [`EvacSim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed, tick duration, default speed, grace period
/// - [`NetworkModel`] — graph plus targets and capacity (owned or `Arc`)
/// - `R: Router` — the routing algorithm (e.g. [`evac_network::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                               |
/// |-----------------------|---------------------------------------|
/// | `.agents(v)`          | No agents                             |
/// | `.random_agents(n)`   | —  (replaces `.agents`, last call wins) |
/// | `.speeds(v)`          | `config.speed_mps` for every agent    |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network, DijkstraRouter)
///     .agents(vec![NodeId(0), NodeId(4), NodeId(9)])
///     .build()?;
/// let summary = sim.run(1_000, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router> {
    config:  SimConfig,
    network: Arc<NetworkModel>,
    router:  R,
    starts:  Option<Starts>,
    speeds:  Option<Vec<f64>>,
}

impl<R: Router> SimBuilder<R> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, network: impl Into<Arc<NetworkModel>>, router: R) -> Self {
        Self {
            config,
            network: network.into(),
            router,
            starts:  None,
            speeds:  None,
        }
    }

    /// One agent per entry, starting at that node.  `AgentId(i)` starts at
    /// `starts[i]`; repeated nodes are fine.
    pub fn agents(mut self, starts: Vec<NodeId>) -> Self {
        self.starts = Some(Starts::Nodes(starts));
        self
    }

    /// `n` agents at start nodes drawn uniformly from the whole network with
    /// a placement stream derived from `config.seed`.
    pub fn random_agents(mut self, n: usize) -> Self {
        self.starts = Some(Starts::Random(n));
        self
    }

    /// Per-agent walking speeds in m/s (must be length `agent_count`).
    pub fn speeds(mut self, speeds: Vec<f64>) -> Self {
        self.speeds = Some(speeds);
        self
    }

    /// Validate inputs, place and route every agent, and return a
    /// ready-to-run [`EvacSim`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Core`] for an invalid config or speed.
    /// - [`SimError::AgentCountMismatch`] if `speeds` has the wrong length.
    /// - [`SimError::Agent`] if a start node is not in the network.
    pub fn build(self) -> SimResult<EvacSim<R>> {
        self.config.validate()?;

        let starts = match self.starts {
            Some(Starts::Nodes(v)) => v,
            Some(Starts::Random(n)) => random_starts(&self.network, n, self.config.seed),
            None => Vec::new(),
        };
        let agent_count = starts.len();

        let speeds = match self.speeds {
            Some(s) => {
                if s.len() != agent_count {
                    return Err(SimError::AgentCountMismatch {
                        expected: agent_count,
                        got:      s.len(),
                        what:     "speeds",
                    });
                }
                for &v in &s {
                    validate_speed(v)?;
                }
                s
            }
            None => vec![self.config.speed_mps; agent_count],
        };

        // ── Route every agent from its start ──────────────────────────────
        let agents = starts
            .iter()
            .zip(&speeds)
            .enumerate()
            .map(|(i, (&start, &speed))| {
                Agent::new(AgentId(i as u32), start, speed, &self.network, &self.router)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scheduler = Scheduler::new(agents, SimRng::new(self.config.seed));
        Ok(EvacSim::from_parts(self.config, self.network, self.router, scheduler))
    }
}

/// A built network always holds at least its targets, so the range is never
/// empty.
fn random_starts(network: &NetworkModel, n: usize, seed: u64) -> Vec<NodeId> {
    let node_count = network.node_count() as u32;
    let mut rng = SimRng::stream(seed, PLACEMENT_STREAM);
    (0..n).map(|_| NodeId(rng.gen_range(0..node_count))).collect()
}
