use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use icu_surge::{AssembledSystem, Result, Scenario};

/// Builds the ICU patient allocation model for a scenario
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// JSON scenario with configuration, capacities, growth parameters and costs
    scenario: PathBuf,
    /// Write the model in LP format to this path
    #[clap(long)]
    lp: Option<PathBuf>,
    /// Solve the model and print the transfers of the first day
    #[clap(long)]
    solve: bool,
}

#[cfg(feature = "gurobi")]
fn solve(scenario: &Scenario, system: &AssembledSystem) -> Result<()> {
    let mut adapter = icu_surge::solver::GurobiAdapter::default();
    let allocation = icu_surge::solve(&mut adapter, system, &scenario.config.solve_limits()?)?;

    for (from, to, patients) in allocation.nonzero_transfers(0) {
        println!("A_{}_{}_0 = {}", from, to, patients);
    }
    if let Some(objective) = allocation.objective {
        println!("Total cost = {}", objective);
    }
    Ok(())
}

#[cfg(not(feature = "gurobi"))]
fn solve(_: &Scenario, _: &AssembledSystem) -> Result<()> {
    Err(icu_surge::Error::Solver(
        "no solver available, rebuild with the `gurobi` feature".to_string(),
    ))
}

fn run(args: &Args) -> Result<()> {
    let scenario = Scenario::from_path(&args.scenario)?;
    let system = scenario.build()?;

    if let Some(path) = &args.lp {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        system.write_lp(&mut file)?;
        info!("Wrote model {} to {}", system.run_id(), path.display());
    }

    if args.solve {
        solve(&scenario, &system)?;
    }

    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{}", err);
        std::process::exit(1);
    }
}
