use thiserror::Error;

use crate::node::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}

/// Bad input, reported before any simulation step runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a ring needs at least one node")]
    EmptyRing,
    #[error("{kind} latency has {len} entries but there are {num_nodes} nodes")]
    LatencyLength {
        kind: &'static str,
        len: usize,
        num_nodes: usize,
    },
    #[error("cannot parse latency list {input:?}: {reason}")]
    LatencyList { input: String, reason: String },
    #[error("total latency of {num_steps} steps overflows")]
    LatencyOverflow { num_steps: usize },
}

/// Internal consistency failures. Seeing one of these means the rotation
/// schedule is wrong, never that the input is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node {node} sends slot {slot} which is already in transit")]
    DoubleSend { node: NodeId, slot: usize },
    #[error("node {node} receives into slot {slot} which is in transit")]
    ReceiveInTransit { node: NodeId, slot: usize },
    #[error("node {node} has no slot {slot}")]
    SlotOutOfRange { node: NodeId, slot: usize },
    #[error("node {node} has no neighbor to send to")]
    NoNeighbor { node: NodeId },
}
