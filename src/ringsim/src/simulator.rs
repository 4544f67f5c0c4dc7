use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::node::{Fragment, Node, NodeId, Ring};
use crate::Latency;

/// Validated input of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSetting {
    pub num_nodes: usize,
    /// Index-aligned to node position.
    pub node_latency: Vec<Latency>,
    /// Link `i` connects node `i` to node `(i + 1) mod n`.
    pub link_latency: Vec<Latency>,
    /// Number of final rotation steps to leave out.
    pub skip: usize,
    /// Offset of the slot exchanged first.
    pub shift: i64,
    /// Keep a record of every transfer.
    pub verbose: bool,
}

impl SimSetting {
    /// A ring of `num_nodes` with every node and link costing 1.
    pub fn uniform(num_nodes: usize) -> Self {
        SimSetting {
            num_nodes,
            node_latency: vec![1; num_nodes],
            link_latency: vec![1; num_nodes],
            skip: 0,
            shift: 0,
            verbose: false,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.num_nodes == 0 {
            return Err(ConfigError::EmptyRing);
        }
        for &(kind, lat) in [("node", &self.node_latency), ("link", &self.link_latency)].iter() {
            if lat.len() != self.num_nodes {
                return Err(ConfigError::LatencyLength {
                    kind,
                    len: lat.len(),
                    num_nodes: self.num_nodes,
                });
            }
        }
        let num_steps = self.num_steps();
        if num_steps > 0 {
            let max_node = self.node_latency.iter().copied().max().unwrap_or(0);
            let max_link = self.link_latency.iter().copied().max().unwrap_or(0);
            max_node
                .checked_add(max_link)
                .and_then(|l| l.checked_mul(num_steps as Latency))
                .ok_or(ConfigError::LatencyOverflow { num_steps })?;
        }
        Ok(())
    }

    /// `N - 1 - skip`, clamped at zero.
    #[inline]
    pub fn num_steps(&self) -> usize {
        self.num_nodes.saturating_sub(1).saturating_sub(self.skip)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer<T> {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub slot: usize,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord<T> {
    /// 0-based step index.
    pub step: usize,
    pub transfers: Vec<Transfer<T>>,
    pub latency: Latency,
}

/// Everything a run produces. Node buffers are read-only from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutput<T> {
    pub node_latency: Vec<Latency>,
    pub link_latency: Vec<Latency>,
    /// Empty unless the run was verbose.
    pub steps: Vec<StepRecord<T>>,
    /// One entry per executed step, verbose or not.
    pub step_latencies: Vec<Latency>,
    pub total_latency: Latency,
    pub nodes: Vec<Node<T>>,
}

impl<T> SimulationOutput<T> {
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_steps(&self) -> usize {
        self.step_latencies.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.index())
    }
}

/// Ring AllReduce over a single unidirectional ring.
///
/// In step `s` every node `i` sends slot `(i + shift - s) mod n` to its
/// neighbor, which folds it into the same slot of its own buffer. The slot a
/// node sends is the one it received in the previous step, so after `n - 1`
/// steps node `i` holds the full reduction in slot `(i + 1 + shift) mod n`.
#[derive(Debug)]
pub struct RingAllReduce<T = String> {
    ring: Ring<T>,
    setting: SimSetting,
}

impl<T: Fragment> RingAllReduce<T> {
    pub fn new(setting: &SimSetting) -> Result<Self> {
        setting.validate()?;
        let ring = Ring::new(setting.num_nodes)?;
        Ok(RingAllReduce {
            ring,
            setting: setting.clone(),
        })
    }

    #[inline]
    pub fn ring(&self) -> &Ring<T> {
        &self.ring
    }

    /// Exchanged slot for sender position `pos` in `step`.
    #[inline]
    fn slot_index(&self, pos: usize, step: usize) -> usize {
        let n = self.ring.len() as i64;
        // reduce first so the sum stays within (-n, 2n)
        let shift = self.setting.shift.rem_euclid(n);
        (pos as i64 + shift - step as i64).rem_euclid(n) as usize
    }

    /// Every step is charged the slowest node plus the slowest link of the
    /// whole ring, since every node sends in every step. `validate` already
    /// made sure this and the total fit in a `Latency`.
    fn step_latency(&self) -> Latency {
        let max_node = self.setting.node_latency.iter().copied().max().unwrap_or(0);
        let max_link = self.setting.link_latency.iter().copied().max().unwrap_or(0);
        max_node + max_link
    }

    fn run_step(&mut self, step: usize) -> Result<Vec<Transfer<T>>> {
        let verbose = self.setting.verbose;
        let mut transfers = Vec::new();
        for pos in 0..self.ring.len() {
            let slot = self.slot_index(pos, step);
            let (sender, receiver) = self.ring.pair_mut(pos)?;
            let value = sender.take(slot)?;
            debug!(
                "step {}: node {} sends {:?} to node {}",
                step,
                sender.id(),
                value,
                receiver.id()
            );
            if verbose {
                transfers.push(Transfer {
                    sender: sender.id(),
                    receiver: receiver.id(),
                    slot,
                    value: value.clone(),
                });
            }
            receiver.accumulate(slot, value)?;
        }
        Ok(transfers)
    }

    /// Run all steps. The simulator is consumed, a second run would start
    /// from already reduced buffers.
    pub fn simulate(mut self) -> Result<SimulationOutput<T>> {
        let num_steps = self.setting.num_steps();
        info!(
            "ring allreduce: {} nodes, {} steps, skip {}, shift {}",
            self.ring.len(),
            num_steps,
            self.setting.skip,
            self.setting.shift
        );

        let mut steps = Vec::new();
        let mut step_latencies = Vec::with_capacity(num_steps);
        let mut total_latency = 0;
        for step in 0..num_steps {
            let transfers = self.run_step(step)?;
            let latency = self.step_latency();
            total_latency += latency;
            step_latencies.push(latency);
            info!("step {} latency: {}", step + 1, latency);
            trace!("buffers after step {}: {:?}", step + 1, self.ring.nodes());
            if self.setting.verbose {
                steps.push(StepRecord {
                    step,
                    transfers,
                    latency,
                });
            }
        }
        info!("total latency: {}", total_latency);

        let SimSetting {
            node_latency,
            link_latency,
            ..
        } = self.setting;
        Ok(SimulationOutput {
            node_latency,
            link_latency,
            steps,
            step_latencies,
            total_latency,
            nodes: self.ring.into_nodes(),
        })
    }
}
