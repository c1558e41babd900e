use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kasuri_core::config::EngineConfig;
use kasuri_core::grid::GridSpec;
use kasuri_core::io::image_io::load_image;
use kasuri_core::workspace::Workspace;

use super::save_workspace;

#[derive(Args)]
pub struct InitArgs {
    /// Photo of the layout sheet
    pub image: PathBuf,

    /// Session file to create
    #[arg(short, long, default_value = "session.json")]
    pub output: PathBuf,

    /// Total rows (thread passes); defaults to the config grid
    #[arg(long)]
    pub rows: Option<u32>,

    /// Total columns (thread lanes); defaults to the config grid
    #[arg(long)]
    pub cols: Option<u32>,
}

pub fn run(args: &InitArgs, config: &EngineConfig) -> Result<()> {
    let source = load_image(&args.image)
        .with_context(|| format!("Failed to load image {}", args.image.display()))?;
    let (width, height) = (source.width(), source.height());

    let mut ws = Workspace::new(config.clone());
    ws.load_image(source);

    let rows = args.rows.unwrap_or(config.grid.rows());
    let cols = args.cols.unwrap_or(config.grid.cols());
    ws.set_grid(GridSpec::new(rows, cols)?);

    save_workspace(&ws, &args.output)?;
    println!(
        "New session for {} ({}x{}), grid {}",
        args.image.display(),
        width,
        height,
        ws.grid()
    );
    println!("Saved to {}", args.output.display());
    Ok(())
}
