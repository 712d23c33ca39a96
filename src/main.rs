use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kart_shuffle::config::Dataset;
use kart_shuffle::report::Summary;
use kart_shuffle::{optimize, optimize_parallel, Sweep};

#[derive(Parser)]
#[command(name = "kart-shuffle", version, about = "Balance karting teams while honoring team size preferences")]
struct Cli {
    /// Dataset file with settings, group sizes and participants
    #[arg(long, default_value = "data/karting.toml")]
    config: PathBuf,

    /// Number of random restarts (overrides the dataset)
    #[arg(long)]
    iterations: Option<usize>,

    /// Seed for the shuffles (overrides the dataset; random when absent in both)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop starting new restarts after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Repeat the swap scan until it accepts nothing
    #[arg(long)]
    until_stable: bool,

    /// Run restarts on all cores
    #[arg(long)]
    parallel: bool,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    enable_tracing();
    let cli = Cli::parse();

    let dataset = Dataset::load(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;
    let mut params = dataset.params();
    if let Some(iterations) = cli.iterations {
        params.iterations = iterations;
    }
    if let Some(secs) = cli.time_limit {
        params.time_limit = Some(Duration::from_secs(secs));
    }
    if cli.until_stable {
        params.sweep = Sweep::UntilStable;
    }
    let seed = cli.seed.or(dataset.seed).unwrap_or_else(rand::random);

    info!(
        participants = dataset.participants.len(),
        groups = dataset.groups.len(),
        iterations = params.iterations,
        seed,
        parallel = cli.parallel,
        "balancing teams"
    );
    let start = Instant::now();
    let table = if cli.parallel {
        optimize_parallel(&dataset.groups, &dataset.participants, &params, seed)
    } else {
        optimize(&dataset.groups, &dataset.participants, &params, &mut SmallRng::seed_from_u64(seed))
    }
    .context("no valid team allocation")?;
    info!(elapsed = ?start.elapsed(), "finished");

    let summary = Summary::from(&table);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
