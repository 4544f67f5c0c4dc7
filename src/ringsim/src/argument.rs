use std::path::PathBuf;

use structopt::StructOpt;

use crate::config::{LatencyList, ReduceOp, RingConfig};

#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "ringsim", about = "Ring AllReduce Simulation")]
pub struct Opt {
    /// Number of nodes
    #[structopt(short = "n", long = "num-nodes", default_value = "5")]
    pub num_nodes: usize,

    /// Comma-separated node latencies, one per node
    #[structopt(long = "node-latency")]
    pub node_latency: Option<LatencyList>,

    /// Comma-separated link latencies, link i goes from node i to node i+1
    #[structopt(long = "link-latency")]
    pub link_latency: Option<LatencyList>,

    /// Number of final steps to skip
    #[structopt(long, default_value = "0")]
    pub skip: usize,

    /// Offset of the first exchanged slot
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub shift: i64,

    /// Pick a random shift in [0, num_nodes), overrides --shift
    #[structopt(long = "rand-shift")]
    pub rand_shift: bool,

    /// Seed of --rand-shift
    #[structopt(long)]
    pub seed: Option<u64>,

    /// Print every transfer of every step
    #[structopt(short = "p", long = "print-steps")]
    pub print_steps: bool,

    /// Reduction to apply: concat or sum
    #[structopt(long, default_value = "concat")]
    pub reduce: ReduceOp,

    /// Read all settings from a TOML file instead, other options are ignored
    #[structopt(short = "c", long = "config")]
    pub config: Option<PathBuf>,
}

impl Opt {
    pub fn to_config(&self) -> RingConfig {
        RingConfig {
            num_nodes: self.num_nodes,
            node_latency: self.node_latency.clone(),
            link_latency: self.link_latency.clone(),
            skip: self.skip,
            shift: self.shift,
            rand_shift: self.rand_shift,
            seed: self.seed,
            print_steps: self.print_steps,
            reduce: self.reduce,
        }
    }
}
