use clap::Parser;
use contagion_io::cli::{
    run_degree_command, run_describe_command, run_robustness_command, run_simulate_command, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }

    match cli.command {
        Commands::Simulate(args) => run_simulate_command(args)?,
        Commands::Robustness(args) => run_robustness_command(args)?,
        Commands::Degree(args) => run_degree_command(args)?,
        Commands::Describe(args) => run_describe_command(args)?,
    }

    Ok(())
}
