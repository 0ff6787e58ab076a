//! Risk Engine Benchmark
//!
//! Runs the fixed performance scenario and prints the report as JSON.

use clap::Parser;
use risk_engine::mc::{build_config, CliArgs as ConfigCliArgs, SimulationOrchestrator};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Risk Engine Benchmark - Monte Carlo throughput check
#[derive(Parser, Debug)]
#[command(name = "risk_benchmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker pool size
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Base seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            workers: args.workers,
            timeout_secs: args.timeout_secs,
            seed: args.seed,
            log_level: args.log_level,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("Risk Engine Benchmark v{}", risk_engine::VERSION);
    tracing::info!(
        workers = config.worker_threads,
        timeout_secs = config.timeout_secs,
        base_seed = config.base_seed,
        log_level = %config.log_level,
        "Engine configuration loaded"
    );

    let engine = SimulationOrchestrator::from_config(&config)?;
    let report = engine.performance_benchmark().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
