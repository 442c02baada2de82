//! Routing trait and default multi-target Dijkstra implementation.
//!
//! # Pluggability
//!
//! Agents call routing through the [`Router`] trait, so applications can swap
//! in another search (A*, contraction hierarchies, a hazard-aware cost) without
//! touching the agent state machine.  [`DijkstraRouter`] is the reference.
//!
//! # Target selection
//!
//! A query names a *set* of candidate targets, not one destination.  The
//! search grows outward from the source and settles on the nearest reachable
//! candidate.  When several candidates sit at exactly the same distance the
//! one listed first in `candidates` wins, independent of heap internals.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use evac_core::NodeId;

use crate::network::NetworkModel;
use crate::{NetworkError, NetworkResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence from source to the chosen
/// target, both inclusive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes to pass in order.  Never empty; `nodes[0]` is the source.
    pub nodes: Vec<NodeId>,
    /// Sum of segment lengths along `nodes`, in metres.
    pub length_m: f64,
}

impl Route {
    /// A route that starts and ends at `node`.
    pub fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], length_m: 0.0 }
    }

    /// The chosen target (last node).
    #[inline]
    pub fn target(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// `true` if the source is itself the target.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() == 1
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so one router can serve replicate
/// simulations running on a thread pool.
pub trait Router: Send + Sync {
    /// Shortest route from `source` to the nearest reachable node in
    /// `candidates`.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::NodeNotFound`] if `source` is not in the network.
    /// - [`NetworkError::Unreachable`] if `candidates` is empty or none of
    ///   them can be reached.
    fn compute_route(
        &self,
        network:    &NetworkModel,
        source:     NodeId,
        candidates: &[NodeId],
    ) -> NetworkResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over segment lengths, stopping once every candidate at
/// the best distance has been settled.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn compute_route(
        &self,
        network:    &NetworkModel,
        source:     NodeId,
        candidates: &[NodeId],
    ) -> NetworkResult<Route> {
        dijkstra(network, source, candidates)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap key: a non-negative distance with a total order.
#[derive(Clone, Copy, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Best candidate settled so far: (distance, rank in `candidates`, node).
type Best = (f64, usize, NodeId);

fn dijkstra(
    network:    &NetworkModel,
    source:     NodeId,
    candidates: &[NodeId],
) -> NetworkResult<Route> {
    if !network.contains(source) {
        return Err(NetworkError::NodeNotFound(source));
    }

    let n = network.node_count();

    // rank[v] = first position of v in `candidates`.
    let mut rank: Vec<Option<usize>> = vec![None; n];
    for (i, &c) in candidates.iter().enumerate() {
        if network.contains(c) && rank[c.index()].is_none() {
            rank[c.index()] = Some(i);
        }
    }

    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = node we reached v from; INVALID for the source and unreached.
    let mut prev = vec![NodeId::INVALID; n];
    dist[source.index()] = 0.0;

    // Min-heap: Reverse turns BinaryHeap (max) into a min-heap.  The NodeId
    // secondary key keeps pop order deterministic between equal costs.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), source)));

    let mut best: Option<Best> = None;

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        // Everything at the best distance has been settled.
        if let Some((best_cost, _, _)) = best {
            if cost > best_cost {
                break;
            }
        }

        if let Some(r) = rank[node.index()] {
            match best {
                Some((_, best_rank, _)) if best_rank <= r => {}
                _ => best = Some((cost, r, node)),
            }
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_target(edge);
            let new_cost = cost + network.edge_len(edge);
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = node;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    match best {
        Some((cost, _, target)) => Ok(reconstruct(&prev, target, cost)),
        None => Err(NetworkError::Unreachable { from: source }),
    }
}

fn reconstruct(prev: &[NodeId], target: NodeId, length_m: f64) -> Route {
    let mut nodes = vec![target];
    let mut cur = target;
    while prev[cur.index()] != NodeId::INVALID {
        cur = prev[cur.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes, length_m }
}
