//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph is undirected but stored as **Compressed Sparse Row (CSR)**
//! half-edges: every road segment `{u, v}` appears once as `u → v` and once as
//! `v → u`.  Given a `NodeId n`, its half-edges occupy the slice:
//!
//! ```text
//! adj_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Within each row the neighbours are sorted by id, so `edge_length(u, v)` is
//! a binary search over `u`'s row and Dijkstra's inner loop is a contiguous
//! memory scan.
//!
//! # Parallel edges
//!
//! Ingested networks often carry several ways between the same junctions.
//! They collapse at build time to the single segment of minimal length; that
//! is the only length routing or movement ever sees.

use std::collections::BTreeMap;

use evac_core::{EdgeId, NodeId, Point};

use crate::{NetworkError, NetworkResult, TargetSet};

// ── NetworkModel ──────────────────────────────────────────────────────────────

/// Immutable undirected road graph plus the evacuation targets.
///
/// Do not construct directly; use [`NetworkBuilder`].
#[derive(Clone, Debug)]
pub struct NetworkModel {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    node_pos: Vec<Point>,

    // ── CSR half-edge adjacency ───────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    /// Neighbour at the far end of each half-edge.  Indexed by `EdgeId`.
    adj_to: Vec<NodeId>,

    /// Length of each half-edge in metres.  Indexed by `EdgeId`.
    adj_length_m: Vec<f64>,

    // ── Targets ───────────────────────────────────────────────────────────
    targets: TargetSet,
}

impl NetworkModel {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of undirected road segments after parallel-edge collapse.
    pub fn edge_count(&self) -> usize {
        self.adj_to.len() / 2
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    /// Position of `node`.
    pub fn node_pos(&self, node: NodeId) -> NetworkResult<Point> {
        self.node_pos
            .get(node.index())
            .copied()
            .ok_or(NetworkError::NodeNotFound(node))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Half-edge ids leaving `node`.  The caller must have checked
    /// [`contains`](Self::contains).
    #[inline]
    pub(crate) fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()];
        let end   = self.node_out_start[node.index() + 1];
        (start..end).map(EdgeId)
    }

    #[inline]
    pub(crate) fn edge_target(&self, edge: EdgeId) -> NodeId {
        self.adj_to[edge.index()]
    }

    #[inline]
    pub(crate) fn edge_len(&self, edge: EdgeId) -> f64 {
        self.adj_length_m[edge.index()]
    }

    /// Nodes adjacent to `node`, ascending by id.
    pub fn neighbors(&self, node: NodeId) -> NetworkResult<&[NodeId]> {
        if !self.contains(node) {
            return Err(NetworkError::NodeNotFound(node));
        }
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        Ok(&self.adj_to[start..end])
    }

    /// Collapsed length of the segment `{u, v}`.
    ///
    /// Fails with [`NetworkError::NoEdge`] if the two nodes are not adjacent
    /// (including when either is not in the network).
    pub fn edge_length(&self, u: NodeId, v: NodeId) -> NetworkResult<f64> {
        let row = self
            .neighbors(u)
            .map_err(|_| NetworkError::NoEdge { from: u, to: v })?;
        let start = self.node_out_start[u.index()] as usize;
        row.binary_search(&v)
            .map(|i| self.adj_length_m[start + i])
            .map_err(|_| NetworkError::NoEdge { from: u, to: v })
    }

    /// Resolved coordinate `fraction` of the way along `u → v`.
    ///
    /// Straight-line interpolation between the endpoint coordinates; the road
    /// geometry between junctions is not modelled.
    pub fn interpolate(&self, u: NodeId, v: NodeId, fraction: f64) -> NetworkResult<Point> {
        Ok(self.node_pos(u)?.lerp(self.node_pos(v)?, fraction))
    }

    // ── Targets ───────────────────────────────────────────────────────────

    /// The configured targets and their shared capacity.
    #[inline]
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`NetworkModel`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes, edges, and targets in any order and defers all
/// validation to `build()`, which reports the first problem it finds.
///
/// # Example
///
/// ```
/// use evac_core::Point;
/// use evac_network::NetworkBuilder;
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(100.0, 0.0));
/// b.add_edge(a, c, 120.0);
/// b.add_edge(c, a, 100.0); // parallel way, shorter: wins
/// b.add_target(c);
/// b.capacity(50);
/// let net = b.build().unwrap();
/// assert_eq!(net.edge_count(), 1);
/// assert_eq!(net.edge_length(a, c).unwrap(), 100.0);
/// ```
#[derive(Default)]
pub struct NetworkBuilder {
    nodes:     Vec<Point>,
    raw_edges: Vec<RawEdge>,
    targets:   Vec<NodeId>,
    capacity:  u32,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            ..Self::default()
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an undirected road segment of `length_m` metres.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.raw_edges.push(RawEdge { from: a, to: b, length_m });
    }

    /// Mark `node` as an evacuation target.  Order of calls is preserved.
    pub fn add_target(&mut self, node: NodeId) {
        self.targets.push(node);
    }

    /// Shared capacity of every target.  Default: 0.
    pub fn capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    /// Look up the position of a node added earlier (used by ingestion code
    /// to derive segment lengths from coordinates).
    pub fn node_pos(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate and consume the builder.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::InvalidCoordinate`] for a non-finite node position.
    /// - [`NetworkError::InvalidGraph`] for a negative, NaN, or infinite
    ///   length, or an endpoint that was never added.
    /// - [`NetworkError::NodeNotFound`] for a target that was never added.
    /// - [`NetworkError::EmptyTargetSet`] if no target was added.
    pub fn build(self) -> NetworkResult<NetworkModel> {
        let node_count = self.nodes.len();

        for (i, pos) in self.nodes.iter().enumerate() {
            if !pos.is_finite() {
                return Err(NetworkError::InvalidCoordinate(NodeId(i as u32)));
            }
        }

        // Collapse to one segment per unordered pair, keeping the shortest.
        let mut segments: BTreeMap<(NodeId, NodeId), f64> = BTreeMap::new();
        for e in &self.raw_edges {
            if e.from.index() >= node_count || e.to.index() >= node_count {
                return Err(NetworkError::InvalidGraph {
                    from:   e.from,
                    to:     e.to,
                    reason: "endpoint not in network".into(),
                });
            }
            if !(e.length_m.is_finite() && e.length_m >= 0.0) {
                return Err(NetworkError::InvalidGraph {
                    from:   e.from,
                    to:     e.to,
                    reason: format!("length {} is not a finite non-negative number", e.length_m),
                });
            }
            if e.from == e.to {
                continue; // self-loops never lie on a shortest path
            }
            let key = (e.from.min(e.to), e.from.max(e.to));
            segments
                .entry(key)
                .and_modify(|len| *len = len.min(e.length_m))
                .or_insert(e.length_m);
        }

        for &t in &self.targets {
            if t.index() >= node_count {
                return Err(NetworkError::NodeNotFound(t));
            }
        }
        let targets = TargetSet::new(self.targets, self.capacity);
        if targets.is_empty() {
            return Err(NetworkError::EmptyTargetSet);
        }

        // Expand to half-edges sorted by (from, to) for CSR construction.
        let mut half: Vec<(NodeId, NodeId, f64)> = Vec::with_capacity(segments.len() * 2);
        for (&(a, b), &len) in &segments {
            half.push((a, b, len));
            half.push((b, a, len));
        }
        half.sort_unstable_by_key(|&(from, to, _)| (from, to));

        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &half {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, half.len());

        Ok(NetworkModel {
            node_pos:     self.nodes,
            node_out_start,
            adj_to:       half.iter().map(|&(_, to, _)| to).collect(),
            adj_length_m: half.iter().map(|&(_, _, len)| len).collect(),
            targets,
        })
    }
}
