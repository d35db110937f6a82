//! Command-line driver: load labeled points, run the synthesis
//! pipeline, print the resulting inequality system.

mod data;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use constraint_synth_core::config::SynthConfig;
use constraint_synth_core::synthesis::synthesize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "constraint-synth",
    about = "Synthesize linear constraints bounding a labeled point cloud"
)]
struct Args {
    /// Input file: one point per line, coordinates then the label
    /// column (1 = positive).
    #[arg(short, long)]
    input: PathBuf,

    /// Field delimiter in the input file.
    #[arg(long, default_value = " ")]
    delimiter: char,

    /// Seed for all random operations.
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum cluster count of the initial partition.
    #[arg(long)]
    clusters: Option<usize>,

    /// Number of random candidate constraints per cluster.
    #[arg(long)]
    random_constraints: Option<usize>,

    /// Treat the whole input as a single cluster.
    #[arg(long)]
    single_cluster: bool,

    /// Optional TOML configuration file (flags override it).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SynthConfig::from_file(path)?,
        None => SynthConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(clusters) = args.clusters {
        config.clustering.min_k = clusters;
    }
    if let Some(count) = args.random_constraints {
        config.generator.count = count;
    }
    if args.single_cluster {
        config.clustering.enforce_single_cluster = true;
    }

    let points = data::load_points(&args.input, args.delimiter)?;
    info!(
        points = points.len(),
        positives = points.iter().filter(|p| p.is_positive()).count(),
        "input loaded"
    );

    let synthesis = synthesize(&points, &config)?;
    print!("{}", render::render_system(&synthesis));

    Ok(())
}
