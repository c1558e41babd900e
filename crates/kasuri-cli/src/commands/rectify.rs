use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use kasuri_core::config::EngineConfig;
use kasuri_core::io::image_io::{save_marked_png, save_raster_png};

use super::{attach_photo, open_workspace};

#[derive(Args)]
pub struct RectifyArgs {
    /// Session file
    pub session: PathBuf,

    /// Output PNG path
    #[arg(short, long, default_value = "rectified.png")]
    pub output: PathBuf,

    /// Draw the session's markers onto the output
    #[arg(long)]
    pub markers: bool,
}

pub fn run(args: &RectifyArgs, config: &EngineConfig) -> Result<()> {
    let mut ws = open_workspace(&args.session, config)?;
    attach_photo(&mut ws)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    pb.set_message("Rectifying...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = ws.refresh_raster();
    pb.finish_and_clear();
    result.context("Rectification failed")?;

    let raster = ws.raster().context("No rectified raster was produced")?;
    if args.markers {
        save_marked_png(&raster, &ws.marker_snapshot(), &args.output)?;
    } else {
        save_raster_png(&raster, &args.output)?;
    }

    println!(
        "Rectified {}x{} raster saved to {}",
        raster.width(),
        raster.height(),
        args.output.display()
    );
    Ok(())
}
