//! The evacuation target set.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use evac_core::NodeId;

/// Ordered target nodes sharing one capacity limit.
///
/// The order is the order the targets were configured in (duplicates dropped,
/// first occurrence kept).  It is significant: routing breaks distance ties in
/// favour of the target that appears first, and each target's position in the
/// list is its *slot* for occupancy bookkeeping.
#[derive(Clone, Debug)]
pub struct TargetSet {
    nodes:    Vec<NodeId>,
    slots:    HashMap<NodeId, usize>,
    capacity: u32,
}

impl TargetSet {
    /// Collect `nodes` in order, dropping repeats.
    pub(crate) fn new(nodes: impl IntoIterator<Item = NodeId>, capacity: u32) -> Self {
        let mut ordered = Vec::new();
        let mut slots = HashMap::default();
        for node in nodes {
            if !slots.contains_key(&node) {
                slots.insert(node, ordered.len());
                ordered.push(node);
            }
        }
        Self { nodes: ordered, slots, capacity }
    }

    /// Target node ids in configured order.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Maximum number of agents that may be admitted at any one target.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Position of `node` in the configured order, if it is a target.
    #[inline]
    pub fn slot(&self, node: NodeId) -> Option<usize> {
        self.slots.get(&node).copied()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.slots.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
