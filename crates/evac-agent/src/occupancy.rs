//! Per-target admission counts.

use evac_core::NodeId;
use evac_network::TargetSet;

use crate::{AgentError, AgentResult};

/// How many agents each target has admitted so far.
///
/// This is the only state agents share.  The scheduler hands it to one agent
/// at a time, and [`try_admit`](Self::try_admit) checks and claims a place in
/// a single call, so a target can never admit more than the shared capacity.
#[derive(Clone, Debug)]
pub struct TargetOccupancy {
    targets: TargetSet,
    /// Admitted count per target slot (TargetSet order).
    counts:  Vec<u32>,
}

impl TargetOccupancy {
    /// All targets empty.
    pub fn new(targets: &TargetSet) -> Self {
        Self {
            targets: targets.clone(),
            counts:  vec![0; targets.len()],
        }
    }

    /// Admit one agent at `node` if it has room.
    ///
    /// Returns `Ok(true)` and records the agent when the target is below
    /// capacity, `Ok(false)` when it is full.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotATarget`] if `node` is not in the target set.
    pub fn try_admit(&mut self, node: NodeId) -> AgentResult<bool> {
        let slot = self.targets.slot(node).ok_or(AgentError::NotATarget(node))?;
        if self.counts[slot] < self.targets.capacity() {
            self.counts[slot] += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Agents admitted at `node`, or `None` if it is not a target.
    pub fn occupants(&self, node: NodeId) -> Option<u32> {
        self.targets.slot(node).map(|slot| self.counts[slot])
    }

    /// `true` once `node` has admitted `capacity` agents.
    pub fn is_full(&self, node: NodeId) -> Option<bool> {
        self.occupants(node).map(|n| n >= self.targets.capacity())
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.targets.capacity()
    }

    /// `(target, occupants)` in TargetSet order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.targets.nodes().iter().copied().zip(self.counts.iter().copied())
    }

    /// Agents admitted across all targets.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }
}
