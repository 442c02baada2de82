//! The evacuee record and its per-tick state machine.

use evac_core::{AgentId, AgentStatus, NodeId, Point};
use evac_network::{NetworkError, NetworkModel, Route, Router};
use tracing::{debug, trace};

use crate::{AgentError, AgentResult, TargetOccupancy};

// ── StepOutcome ───────────────────────────────────────────────────────────────

/// What happened to an agent during one [`Agent::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The agent was already terminal; nothing changed.
    Idle,
    /// Still active after spending its budget.
    Moving,
    /// Admitted by the given target this step.
    Evacuated(NodeId),
    /// Lost its last reachable candidate this step.
    Stranded,
}

/// Result of checking in at the end of the current route.
enum Arrival {
    Admitted(NodeId),
    Rerouted,
    Stranded,
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// A single evacuee.
///
/// Position is `current_node` plus `distance_along_edge` metres towards the
/// next route node.  Once the agent is [`Evacuated`](AgentStatus::Evacuated)
/// or [`Stranded`](AgentStatus::Stranded) its position and route are frozen.
#[derive(Clone, Debug)]
pub struct Agent {
    id:                  AgentId,
    current_node:        NodeId,
    distance_along_edge: f64,
    route:               Route,
    route_index:         usize,
    speed_mps:           f64,
    status:              AgentStatus,
    reroute_count:       u32,
    /// Targets not yet found full.  Starts as the full target set and only
    /// shrinks.
    candidates:          Vec<NodeId>,
}

impl Agent {
    /// Place a new agent at `start` and route it to the nearest target.
    ///
    /// An agent that cannot reach any target starts out `Stranded` with a
    /// trivial route.  An agent that starts on a target gets a one-node route
    /// and checks in on its first step.
    ///
    /// # Errors
    ///
    /// Any routing error other than [`NetworkError::Unreachable`], e.g.
    /// `NodeNotFound` for a start node outside the network, and
    /// [`AgentError::OffCandidateRoute`] if the router picks a node that is
    /// not a target.
    pub fn new<R: Router + ?Sized>(
        id:        AgentId,
        start:     NodeId,
        speed_mps: f64,
        network:   &NetworkModel,
        router:    &R,
    ) -> AgentResult<Self> {
        let candidates = network.targets().nodes().to_vec();
        let (route, status) = match router.compute_route(network, start, &candidates) {
            Ok(route) => {
                check_target(id, &route, &candidates)?;
                (route, AgentStatus::Active)
            }
            Err(NetworkError::Unreachable { .. }) => {
                debug!(agent = %id, start = %start, "no target reachable from start");
                (Route::trivial(start), AgentStatus::Stranded)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            id,
            current_node: start,
            distance_along_edge: 0.0,
            route,
            route_index: 0,
            speed_mps,
            status,
            reroute_count: 0,
            candidates,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Last node reached.
    #[inline]
    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    /// Metres travelled past `current_node` towards [`next_node`](Self::next_node).
    #[inline]
    pub fn distance_along_edge(&self) -> f64 {
        self.distance_along_edge
    }

    #[inline]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[inline]
    pub fn route_index(&self) -> usize {
        self.route_index
    }

    #[inline]
    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    #[inline]
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    #[inline]
    pub fn reroute_count(&self) -> u32 {
        self.reroute_count
    }

    /// Targets still under consideration.
    #[inline]
    pub fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    /// The node the agent is heading to, or `None` when it is terminal or
    /// standing at the end of its route.
    pub fn next_node(&self) -> Option<NodeId> {
        if self.status.is_terminal() {
            return None;
        }
        self.route.nodes.get(self.route_index + 1).copied()
    }

    /// Progress along the current edge in `[0, 1]`; `0.0` when not on an edge
    /// or the edge has zero length.
    pub fn edge_fraction(&self, network: &NetworkModel) -> AgentResult<f64> {
        let Some(next) = self.next_node() else {
            return Ok(0.0);
        };
        let length = network.edge_length(self.current_node, next)?;
        if length > 0.0 {
            Ok((self.distance_along_edge / length).clamp(0.0, 1.0))
        } else {
            Ok(0.0)
        }
    }

    /// Planar position, interpolated along the current edge.
    pub fn position(&self, network: &NetworkModel) -> AgentResult<Point> {
        match self.next_node() {
            Some(next) => {
                let fraction = self.edge_fraction(network)?;
                Ok(network.interpolate(self.current_node, next, fraction)?)
            }
            None => Ok(network.node_pos(self.current_node)?),
        }
    }

    // ── Step ──────────────────────────────────────────────────────────────────

    /// Spend `budget_m` metres of movement.
    ///
    /// Crosses as many nodes as the budget allows, checks in at the route's
    /// target on arrival, and reroutes in place when that target is full.  A
    /// terminal agent is left untouched and reports [`StepOutcome::Idle`].
    ///
    /// # Errors
    ///
    /// Routing or lookup failures other than "no candidate reachable".  Those
    /// indicate a network that disagrees with the agent's route and are not
    /// recoverable.  A router that answers with a target outside the
    /// remaining candidates fails with [`AgentError::OffCandidateRoute`];
    /// every reroute must drop a candidate or the loop would never end.
    pub fn step<R: Router + ?Sized>(
        &mut self,
        budget_m:  f64,
        network:   &NetworkModel,
        router:    &R,
        occupancy: &mut TargetOccupancy,
    ) -> AgentResult<StepOutcome> {
        if self.status.is_terminal() {
            return Ok(StepOutcome::Idle);
        }

        let mut budget = budget_m.max(0.0);
        loop {
            if self.route_index + 1 >= self.route.nodes.len() {
                match self.arrive(network, router, occupancy)? {
                    Arrival::Admitted(target) => return Ok(StepOutcome::Evacuated(target)),
                    Arrival::Stranded => return Ok(StepOutcome::Stranded),
                    Arrival::Rerouted => continue,
                }
            }

            let next = self.route.nodes[self.route_index + 1];
            let length = network.edge_length(self.current_node, next)?;
            let remaining = length - self.distance_along_edge;

            if budget >= remaining {
                budget -= remaining;
                self.reach(next);
                continue;
            }

            let travelled = self.distance_along_edge + budget;
            if travelled < length {
                self.distance_along_edge = travelled;
                return Ok(StepOutcome::Moving);
            }
            // Rounding carried us onto the node with nothing to spare.
            budget = 0.0;
            self.reach(next);
        }
    }

    fn reach(&mut self, node: NodeId) {
        self.current_node = node;
        self.route_index += 1;
        self.distance_along_edge = 0.0;
    }

    fn arrive<R: Router + ?Sized>(
        &mut self,
        network:   &NetworkModel,
        router:    &R,
        occupancy: &mut TargetOccupancy,
    ) -> AgentResult<Arrival> {
        let here = self.current_node;
        if occupancy.try_admit(here)? {
            self.status = AgentStatus::Evacuated;
            trace!(agent = %self.id, target = %here, "evacuated");
            return Ok(Arrival::Admitted(here));
        }

        self.candidates.retain(|&c| c != here);
        self.reroute_count += 1;

        match router.compute_route(network, here, &self.candidates) {
            Ok(route) => {
                check_target(self.id, &route, &self.candidates)?;
                debug!(
                    agent = %self.id,
                    full = %here,
                    next_target = %route.target(),
                    reroutes = self.reroute_count,
                    "target full, rerouting"
                );
                self.route = route;
                self.route_index = 0;
                Ok(Arrival::Rerouted)
            }
            Err(NetworkError::Unreachable { .. }) => {
                self.status = AgentStatus::Stranded;
                debug!(
                    agent = %self.id,
                    at = %here,
                    reroutes = self.reroute_count,
                    "no reachable target left, stranded"
                );
                Ok(Arrival::Stranded)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A route must end on one of the agent's remaining candidates.
fn check_target(agent: AgentId, route: &Route, candidates: &[NodeId]) -> AgentResult<()> {
    let target = route.target();
    if candidates.contains(&target) {
        Ok(())
    } else {
        Err(AgentError::OffCandidateRoute { agent, target })
    }
}
