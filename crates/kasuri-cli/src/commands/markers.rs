use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kasuri_core::config::EngineConfig;
use kasuri_core::grid::GridField;

use super::{open_workspace, save_workspace};

#[derive(Args)]
pub struct MarkersArgs {
    /// Session file
    pub session: PathBuf,

    /// Remove the marker at this 1-based position
    #[arg(long, conflicts_with_all = ["pop", "clear"])]
    pub remove: Option<usize>,

    /// Remove the most recent marker
    #[arg(long, conflicts_with = "clear")]
    pub pop: bool,

    /// Remove all markers
    #[arg(long)]
    pub clear: bool,

    /// New total rows for later markers
    #[arg(long)]
    pub rows: Option<String>,

    /// New total columns for later markers
    #[arg(long)]
    pub cols: Option<String>,
}

pub fn run(args: &MarkersArgs, config: &EngineConfig) -> Result<()> {
    let mut ws = open_workspace(&args.session, config)?;

    if let Some(position) = args.remove {
        let index = position
            .checked_sub(1)
            .context("Marker positions start at 1")?;
        let removed = ws.remove_marker(index)?;
        println!(
            "Removed marker {position} (row {}, col {})",
            removed.row_index, removed.col_index
        );
    }
    if args.pop {
        match ws.remove_last_marker() {
            Some(m) => println!("Removed last marker (row {}, col {})", m.row_index, m.col_index),
            None => println!("No markers to remove"),
        }
    }
    if args.clear {
        let count = ws.markers().len();
        ws.replace_markers(Vec::new());
        println!("Removed {count} markers");
    }

    if let Some(text) = &args.rows {
        ws.set_grid_text(GridField::Rows, text)?;
    }
    if let Some(text) = &args.cols {
        ws.set_grid_text(GridField::Cols, text)?;
    }

    save_workspace(&ws, &args.session)?;
    println!("Grid {}, {} markers", ws.grid(), ws.markers().len());
    Ok(())
}
