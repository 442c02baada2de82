use evac_core::{AgentId, NodeId};
use evac_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("node {0} is not an evacuation target")]
    NotATarget(NodeId),

    #[error("router sent agent {agent} to {target}, which is not one of its candidate targets")]
    OffCandidateRoute { agent: AgentId, target: NodeId },

    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

pub type AgentResult<T> = Result<T, AgentError>;
