use crate::{
    load_adjacency, write_json, RobustnessOutput, RunConfig, RunManifest, SimulationOutput,
};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use contagion_core::Network;
use contagion_robustness::{
    AttackStrategy, DegreeDistribution, RemovalOrdering, RobustnessEvaluator, StrategyOrdering,
};
use contagion_sampler::{AggregateResult, BatchReport, MonteCarloDriver};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "contagion")]
#[command(about = "Contagion and robustness analysis for facility networks")]
#[command(long_about = "SIR(C) Monte Carlo simulation with control policies, and global efficiency under node removal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Worker threads (default: one per core)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run Monte Carlo scenarios and report mean infected-fraction curves
    Simulate(SimulateArgs),
    /// Global efficiency under progressive node removal
    Robustness(RobustnessArgs),
    /// Cumulative degree distribution and power-law fit
    Degree(NetworkArgs),
    /// Node and edge summary of a network
    Describe(NetworkArgs),
}

#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Square adjacency table (CSV)
    #[arg(long)]
    pub network: PathBuf,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Run file with [monte_carlo] and [[scenario]] tables
    #[arg(long)]
    pub config: PathBuf,

    /// Override the run file's seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the run file's trial count
    #[arg(long)]
    pub trials: Option<usize>,

    /// JSON results file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RobustnessArgs {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Run file with [[ordering]] tables; every strategy is used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Nodes left out of generated orderings
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Nodes per generated ordering
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Seed of the random ordering
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// JSON results file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run_simulate_command(args: SimulateArgs) -> anyhow::Result<()> {
    let network = load_adjacency(&args.network.network)
        .with_context(|| format!("loading {}", args.network.network.display()))?;
    let run = RunConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let mut mc = run.monte_carlo()?;
    if let Some(seed) = args.seed {
        mc.seed = seed;
    }
    if let Some(trials) = args.trials {
        mc.trials = trials;
    }
    let scenarios = run.scenarios();
    if scenarios.is_empty() {
        bail!("{} defines no [[scenario]] tables", args.config.display());
    }

    println!("Contagion Simulation");
    println!("====================");
    println!("Network: {} nodes, {} edges", network.len(), network.num_edges());
    println!("Scenarios: {}", scenarios.len());
    println!("Trials: {}", mc.trials);
    println!("Seed: {}", mc.seed);

    let manifest = RunManifest::new("simulate", &args.network.network, &network).with_monte_carlo(mc.seed, mc.trials);
    let driver = MonteCarloDriver::new(&network, mc)?;
    let report = driver.run(&scenarios);
    print_batch(&report);

    if let Some(out) = args.out {
        write_json(&SimulationOutput::new(manifest, &report), &out)?;
        println!("\nWrote results to {}", out.display());
    }
    Ok(())
}

fn print_batch(report: &BatchReport) {
    println!();
    println!("{:<28} {:>10} {:>6} {:>10}  most frequent", "scenario", "peak", "step", "final");
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(agg) => print_aggregate(&outcome.label, agg),
            Err(e) => println!("{:<28} FAILED: {}", outcome.label, e),
        }
    }
}

fn print_aggregate(label: &str, agg: &AggregateResult) {
    let (step, peak) = agg.peak().unwrap_or((0, 0.0));
    let combos: Vec<String> = [("sources", &agg.most_common_sources), ("controls", &agg.most_common_controls)]
        .into_iter()
        .filter_map(|(kind, c)| {
            c.as_ref()
                .map(|c| format!("{kind} [{}] x{}", c.nodes.join(", "), c.count))
        })
        .collect();
    println!(
        "{:<28} {:>10.4} {:>6} {:>10.4}  {}",
        label,
        peak,
        step,
        agg.final_fraction().unwrap_or(0.0),
        combos.join("; ")
    );
    if agg.cancelled {
        println!("{:<28} (cancelled after {} of {} trials)", "", agg.completed, agg.trials);
    }
}

fn default_orderings(network: &Network, args: &RobustnessArgs) -> anyhow::Result<Vec<RemovalOrdering>> {
    AttackStrategy::ALL
        .into_iter()
        .map(|strategy| {
            StrategyOrdering::new(strategy)
                .with_limit(args.limit)
                .with_seed(args.seed)
                .build(network, &args.exclude)
                .map_err(Into::into)
        })
        .collect()
}

pub fn run_robustness_command(args: RobustnessArgs) -> anyhow::Result<()> {
    let network = load_adjacency(&args.network.network)
        .with_context(|| format!("loading {}", args.network.network.display()))?;

    let orderings = match &args.config {
        Some(path) => {
            let mut run = RunConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?;
            run.robustness.excluded.extend(args.exclude.iter().cloned());
            run.orderings(&network)?
        }
        None => default_orderings(&network, &args)?,
    };
    if orderings.is_empty() {
        bail!("no removal orderings to evaluate");
    }
    info!(orderings = orderings.len(), "orderings resolved");

    let evaluator = RobustnessEvaluator::new(&network);
    let baseline = evaluator.baseline();
    let report = evaluator.evaluate(&orderings);

    println!("Network Robustness");
    println!("==================");
    println!("Network: {} nodes, {} edges", network.len(), network.num_edges());
    println!("Baseline efficiency: {:.4}", baseline);
    println!();
    for outcome in &report.curves {
        match &outcome.result {
            Ok(curve) => {
                let values: Vec<String> = curve.values.iter().map(|v| format!("{v:.3}")).collect();
                println!("{:<34} loss {:>6.1}%  {}", outcome.label, 100.0 * curve.relative_loss(), values.join(" "));
            }
            Err(e) => println!("{:<34} FAILED: {}", outcome.label, e),
        }
    }

    if let Some(out) = args.out {
        let manifest = RunManifest::new("robustness", &args.network.network, &network);
        write_json(&RobustnessOutput::new(manifest, baseline, &report, &orderings), &out)?;
        println!("\nWrote results to {}", out.display());
    }
    Ok(())
}

pub fn run_degree_command(args: NetworkArgs) -> anyhow::Result<()> {
    let network = load_adjacency(&args.network)?;
    let dist = DegreeDistribution::of(&network);

    println!("Cumulative Degree Distribution");
    println!("==============================");
    println!("{:>6} {:>10}", "k", "P(K>=k)");
    for (k, p) in dist.values.iter().enumerate() {
        println!("{:>6} {:>10.4}", k, p);
    }
    match dist.fit_power_law() {
        Some(fit) => {
            println!();
            println!("P(k) = {:.4} * k^-{:.4}", fit.coefficient, fit.exponent);
            println!("R^2 = {:.4}", fit.r_squared);
        }
        None => println!("\nToo few distinct degrees for a power-law fit"),
    }
    Ok(())
}

pub fn run_describe_command(args: NetworkArgs) -> anyhow::Result<()> {
    let network = load_adjacency(&args.network)?;

    println!("Network: {}", args.network.display());
    println!("Nodes: {}", network.len());
    println!("Edges: {}", network.num_edges());
    println!();
    println!("{:<10} {:>4} {:>4}  successors", "node", "in", "out");
    for (id, label) in network.nodes() {
        let successors: Vec<&str> = network.successors(id).iter().map(|&v| network.label(v)).collect();
        println!(
            "{:<10} {:>4} {:>4}  {}",
            label,
            network.in_degree(id),
            network.out_degree(id),
            successors.join(" ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "contagion", "simulate", "--network", "data.csv", "--config", "run.toml", "--trials", "10", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.network.network, PathBuf::from("data.csv"));
                assert_eq!(args.trials, Some(10));
                assert_eq!(args.seed, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_robustness_defaults() {
        let cli = Cli::try_parse_from([
            "contagion", "--threads", "2", "robustness", "--network", "data.csv", "--exclude", "A1,A2",
        ])
        .unwrap();
        assert_eq!(cli.threads, Some(2));
        match cli.command {
            Commands::Robustness(args) => {
                assert_eq!(args.exclude, vec!["A1", "A2"]);
                assert_eq!(args.limit, 20);
                assert!(args.config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_simulate_requires_config() {
        assert!(Cli::try_parse_from(["contagion", "simulate", "--network", "data.csv"]).is_err());
    }
}
