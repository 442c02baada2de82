//! Agent lifecycle status.

/// Where an agent is in its evacuation.
///
/// `Evacuated` and `Stranded` are absorbing: once an agent leaves `Active` it
/// never changes again.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentStatus {
    /// Still moving toward (or waiting to be admitted at) a target.
    #[default]
    Active,
    /// Admitted at a target with spare capacity.
    Evacuated,
    /// No target with spare capacity is reachable from the agent's position.
    Stranded,
}

impl AgentStatus {
    /// `true` for `Evacuated` and `Stranded`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, AgentStatus::Active)
    }

    /// Human-readable label, useful for log fields and tabular export.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Active    => "active",
            AgentStatus::Evacuated => "evacuated",
            AgentStatus::Stranded  => "stranded",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
