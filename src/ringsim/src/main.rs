use log::info;
use structopt::StructOpt;

use ringsim::{
    argument::Opt,
    config::{self, ReduceOp},
    Fragment, RingAllReduce, SimSetting,
};

fn main() -> anyhow::Result<()> {
    logging::init_log();

    let opt = Opt::from_args();
    info!("Opts: {:?}", opt);

    let config = match &opt.config {
        Some(path) => config::read_config(path)?,
        None => opt.to_config(),
    };
    let setting = config.resolve()?;
    info!("setting: {:?}", setting);

    match config.reduce {
        ReduceOp::Concat => run::<String>(&setting),
        ReduceOp::Sum => run::<u64>(&setting),
    }
}

fn run<T: Fragment + std::fmt::Display>(setting: &SimSetting) -> anyhow::Result<()> {
    let output = RingAllReduce::<T>::new(setting)?.simulate()?;
    print!("{}", output);
    Ok(())
}
