use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use crate::error::ConfigError;
use crate::simulator::SimSetting;
use crate::Latency;

/// Comma-separated latencies, e.g. `2,1,3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatencyList(pub Vec<Latency>);

impl std::str::FromStr for LatencyList {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|x| x.trim().parse::<Latency>())
            .collect::<Result<Vec<_>, _>>()
            .map(LatencyList)
            .map_err(|e| ConfigError::LatencyList {
                input: s.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// How fragments are combined when they arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReduceOp {
    /// Concatenate fragment labels.
    Concat,
    /// Sum numeric contributions.
    Sum,
}

impl Default for ReduceOp {
    fn default() -> Self {
        ReduceOp::Concat
    }
}

fn default_num_nodes() -> usize {
    5
}

/// Unvalidated settings, as they come from the command line or a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RingConfig {
    /// Number of nodes in the ring
    #[serde(default = "default_num_nodes")]
    pub num_nodes: usize,

    /// Per-node latency, defaults to 1 for every node
    #[serde(default)]
    pub node_latency: Option<LatencyList>,

    /// Per-link latency, link i goes from node i to node i+1
    #[serde(default)]
    pub link_latency: Option<LatencyList>,

    #[serde(default)]
    pub skip: usize,

    #[serde(default)]
    pub shift: i64,

    /// Replace `shift` with a uniformly random value in [0, num_nodes)
    #[serde(default)]
    pub rand_shift: bool,

    /// Seed for `rand_shift`, the wall clock is used when absent
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub print_steps: bool,

    #[serde(default)]
    pub reduce: ReduceOp,
}

impl Default for RingConfig {
    fn default() -> Self {
        RingConfig {
            num_nodes: default_num_nodes(),
            node_latency: None,
            link_latency: None,
            skip: 0,
            shift: 0,
            rand_shift: false,
            seed: None,
            print_steps: false,
            reduce: ReduceOp::default(),
        }
    }
}

impl RingConfig {
    /// Fill in defaults, check lengths and pin down the shift. The result is
    /// fully deterministic input for the simulator.
    pub fn resolve(&self) -> Result<SimSetting, ConfigError> {
        let n = self.num_nodes;
        let latency = |l: &Option<LatencyList>| match l {
            Some(l) => l.0.clone(),
            None => vec![1; n],
        };

        let shift = if self.rand_shift && n > 0 {
            let seed = self.seed.unwrap_or_else(wall_clock_seed);
            log::info!("rand_shift seed = {}", seed);
            let mut rng = StdRng::seed_from_u64(seed);
            rng.gen_range(0..n) as i64
        } else {
            self.shift
        };

        let setting = SimSetting {
            num_nodes: n,
            node_latency: latency(&self.node_latency),
            link_latency: latency(&self.link_latency),
            skip: self.skip,
            shift,
            verbose: self.print_steps,
        };
        setting.validate()?;
        Ok(setting)
    }
}

fn wall_clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn read_config<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<RingConfig> {
    use anyhow::Context;
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("fail to open file {:?}", path))?;
    let config = toml::from_str(&content).with_context(|| format!("parse {:?} failed", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_latency_list() {
        assert_eq!("2,1,3".parse::<LatencyList>(), Ok(LatencyList(vec![2, 1, 3])));
        assert_eq!(" 4 , 5".parse::<LatencyList>(), Ok(LatencyList(vec![4, 5])));
        let err = "1,,2".parse::<LatencyList>().unwrap_err();
        assert!(matches!(err, ConfigError::LatencyList { .. }));
        assert!("1,-2".parse::<LatencyList>().is_err());
    }

    #[test]
    fn defaults_are_all_ones() {
        let setting = RingConfig::default().resolve().unwrap();
        assert_eq!(setting, SimSetting::uniform(5));
    }

    #[test]
    fn mismatched_latency_is_rejected() {
        let config = RingConfig {
            num_nodes: 3,
            node_latency: Some(LatencyList(vec![1, 2])),
            ..Default::default()
        };
        assert_eq!(
            config.resolve(),
            Err(ConfigError::LatencyLength {
                kind: "node",
                len: 2,
                num_nodes: 3
            })
        );
    }

    #[test]
    fn rand_shift_is_seeded_and_in_range() {
        let config = RingConfig {
            num_nodes: 7,
            shift: 100,
            rand_shift: true,
            seed: Some(42),
            ..Default::default()
        };
        let a = config.resolve().unwrap();
        let b = config.resolve().unwrap();
        assert_eq!(a.shift, b.shift);
        assert!((0..7).contains(&a.shift));
    }

    #[test]
    fn from_toml() {
        let config: RingConfig = toml::from_str(
            r#"
            num_nodes = 3
            node_latency = [2, 1, 3]
            skip = 1
            print_steps = true
            reduce = "sum"
            "#,
        )
        .unwrap();
        assert_eq!(config.reduce, ReduceOp::Sum);
        let setting = config.resolve().unwrap();
        assert_eq!(setting.node_latency, vec![2, 1, 3]);
        assert_eq!(setting.link_latency, vec![1, 1, 1]);
        assert_eq!(setting.skip, 1);
        assert!(setting.verbose);

        assert!(toml::from_str::<RingConfig>("nodes = 3").is_err());
    }

    #[test]
    fn reduce_op_from_str() {
        assert_eq!("concat".parse::<ReduceOp>().unwrap(), ReduceOp::Concat);
        assert_eq!("sum".parse::<ReduceOp>().unwrap(), ReduceOp::Sum);
        assert!("avg".parse::<ReduceOp>().is_err());
    }
}
