//! Per-tick activation order.

use evac_agent::{Agent, AgentResult, StepOutcome, TargetOccupancy};
use evac_core::{SimConfig, SimRng};
use evac_network::{NetworkModel, Router};

/// What the agents did during one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickActivity {
    /// Agents still active after their step.
    pub moving:    usize,
    /// Agents admitted by a target this tick.
    pub evacuated: usize,
    /// Agents that ran out of reachable targets this tick.
    pub stranded:  usize,
}

/// Owns every agent and steps them one at a time in a fresh random order each
/// tick.
///
/// The order is a seeded permutation of agent indices, so two schedulers built
/// from the same seed and agents produce identical capacity races.
#[derive(Clone, Debug)]
pub struct Scheduler {
    agents: Vec<Agent>,
    /// Activation order of the most recent tick (indices into `agents`).
    order:  Vec<usize>,
    rng:    SimRng,
}

impl Scheduler {
    /// `agents[i]` must carry `AgentId(i)`.
    pub fn new(agents: Vec<Agent>, rng: SimRng) -> Self {
        let order = (0..agents.len()).collect();
        Self { agents, order, rng }
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent indices in the order they were activated on the last tick
    /// (id order before the first tick).
    #[inline]
    pub fn last_order(&self) -> &[usize] {
        &self.order
    }

    /// Run one tick: shuffle, then step every agent with its
    /// [movement budget](SimConfig::movement_budget).
    ///
    /// Terminal agents are still visited (their step is a no-op), so the
    /// number of RNG draws per tick depends only on the agent count.
    pub fn tick<R: Router + ?Sized>(
        &mut self,
        config:    &SimConfig,
        network:   &NetworkModel,
        router:    &R,
        occupancy: &mut TargetOccupancy,
    ) -> AgentResult<TickActivity> {
        for (i, slot) in self.order.iter_mut().enumerate() {
            *slot = i;
        }
        self.rng.shuffle(&mut self.order);

        let mut activity = TickActivity::default();
        for &i in &self.order {
            let agent = &mut self.agents[i];
            let budget = config.movement_budget(agent.speed_mps());
            match agent.step(budget, network, router, occupancy)? {
                StepOutcome::Idle => {}
                StepOutcome::Moving => activity.moving += 1,
                StepOutcome::Evacuated(_) => activity.evacuated += 1,
                StepOutcome::Stranded => activity.stranded += 1,
            }
        }
        Ok(activity)
    }
}
