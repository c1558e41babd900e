mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kasuri", about = "Rectify photos of layout sheets and measure grid positions")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new session for a photo
    Init(commands::init::InitArgs),
    /// Show a session summary
    Info(commands::info::InfoArgs),
    /// Set or drag the calibration corners
    Calibrate(commands::calibrate::CalibrateArgs),
    /// Rectify the calibrated region and save it as PNG
    Rectify(commands::rectify::RectifyArgs),
    /// Add a marker and report its grid cell
    Measure(commands::measure::MeasureArgs),
    /// Edit the marker list and grid dimensions
    Markers(commands::markers::MarkersArgs),
    /// Print or save the engine config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = commands::load_engine_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &config),
        Commands::Info(args) => commands::info::run(args),
        Commands::Calibrate(args) => commands::calibrate::run(args, &config),
        Commands::Rectify(args) => commands::rectify::run(args, &config),
        Commands::Measure(args) => commands::measure::run(args, &config),
        Commands::Markers(args) => commands::markers::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
