//! Network-subsystem error type.

use thiserror::Error;

use evac_core::NodeId;

/// Errors produced by `evac-network`.
///
/// `InvalidGraph` and `EmptyTargetSet` are construction-time and fatal.
/// `NoEdge` means a route was walked against a graph it was not built from.
/// `Unreachable` is an ordinary outcome of routing; the agent layer turns it
/// into the Stranded status.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("invalid edge {from} - {to}: {reason}")]
    InvalidGraph {
        from:   NodeId,
        to:     NodeId,
        reason: String,
    },

    #[error("invalid coordinate for node {0}")]
    InvalidCoordinate(NodeId),

    #[error("no evacuation targets configured")]
    EmptyTargetSet,

    #[error("no edge between {from} and {to}")]
    NoEdge { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("no candidate target reachable from {from}")]
    Unreachable { from: NodeId },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
