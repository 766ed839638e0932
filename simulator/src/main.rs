use anyhow::Context;
use api::routes::serve;
use clap::Parser;
use ecgcore::telemetry::LogManager;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::SimulatorConfig;

mod api;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic ECG feed and clinic backend")]
struct Args {
    /// Load the simulator config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 4000)]
    port: u16,
    /// Heart rate of the synthetic signal
    #[arg(long, default_value_t = 72.0)]
    bpm: f32,
    /// Samples per second on the live feed
    #[arg(long, default_value_t = 250)]
    rate: u32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        SimulatorConfig::load(path)?
    } else {
        SimulatorConfig::from_args(args.port, args.rate, args.bpm, args.seed)
    };

    LogManager::new("simulator").record(&format!(
        "{} patients, {} Hz feed in blocks of {}",
        config.patients.len(),
        config.generator.sampling_rate_hz,
        config.generator.block_size
    ));

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating simulator runtime")?;
    runtime.block_on(serve(config))
}
