//! Per-tick state published to observers.
//!
//! A [`TickSnapshot`] is a plain value: it owns its data and borrows nothing
//! from the simulation, so collectors can keep it, send it to another thread,
//! or serialize it (with the `serde` feature) without touching the engine.

use evac_core::{AgentId, AgentStatus, NodeId, Point, Tick};

/// Aggregate status counts.  Always sums to the number of agents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickCounts {
    pub evacuated: usize,
    pub stranded:  usize,
    pub active:    usize,
}

impl TickCounts {
    #[inline]
    pub fn total(&self) -> usize {
        self.evacuated + self.stranded + self.active
    }

    /// `true` once nobody is still moving.
    #[inline]
    pub fn all_terminal(&self) -> bool {
        self.active == 0
    }
}

/// One agent's published state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id:            AgentId,
    pub current_node:  NodeId,
    /// `None` once terminal or while waiting at the end of the route.
    pub next_node:     Option<NodeId>,
    /// Progress towards `next_node`, in `[0, 1)`.
    pub edge_fraction: f64,
    /// Resolved planar coordinate.
    pub position:      Point,
    pub status:        AgentStatus,
    pub reroute_count: u32,
}

/// One target's published occupancy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetSnapshot {
    pub node:        NodeId,
    pub occupants:   u32,
    pub at_capacity: bool,
}

/// Everything an external collector receives after a tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSnapshot {
    /// 1-based: the snapshot after the first tick is `Tick(1)`.
    pub tick:            Tick,
    /// Sorted by `id`.
    pub agents:          Vec<AgentSnapshot>,
    pub evacuated_count: usize,
    pub stranded_count:  usize,
    pub active_count:    usize,
    /// In TargetSet order.
    pub targets:         Vec<TargetSnapshot>,
}

impl TickSnapshot {
    pub fn counts(&self) -> TickCounts {
        TickCounts {
            evacuated: self.evacuated_count,
            stranded:  self.stranded_count,
            active:    self.active_count,
        }
    }
}

/// Returned by [`EvacSim::run`](crate::EvacSim::run).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Ticks executed since construction.
    pub ticks_run:    u64,
    /// The tick after which every agent was terminal, if that happened.
    pub completed_at: Option<Tick>,
    pub evacuated:    usize,
    pub stranded:     usize,
    pub active:       usize,
    pub total:        usize,
}
