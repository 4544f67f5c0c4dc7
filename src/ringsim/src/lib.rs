pub mod error;
pub use error::{ConfigError, Error, InvariantViolation, Result};

pub mod node;
pub use node::{Fragment, Node, NodeId, Ring, Slot};

pub mod simulator;
pub use simulator::{RingAllReduce, SimSetting, SimulationOutput, StepRecord, Transfer};

pub mod report;

pub mod argument;
pub mod config;

/// Latencies are abstract time units, they are summed and never slept on.
pub type Latency = u64;
