use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use kasuri_core::config::EngineConfig;
use kasuri_core::geometry::Point2;
use kasuri_core::markers::Marker;
use kasuri_core::rectify::raster_dimensions;
use kasuri_core::viewport::{PointerEvent, ViewSize};
use kasuri_core::workspace::Workspace;

use super::{open_workspace, parse_point, save_workspace};

#[derive(Args)]
pub struct MeasureArgs {
    /// Session file
    pub session: PathBuf,

    /// Normalized position on the rectified raster
    #[arg(long, value_parser = parse_point, conflicts_with_all = ["source", "screen"])]
    pub at: Option<Point2>,

    /// Normalized position on the original photo
    #[arg(long, value_parser = parse_point, conflicts_with = "screen")]
    pub source: Option<Point2>,

    /// Tap position in viewport pixels (needs --view)
    #[arg(long, value_parser = parse_point, requires = "view")]
    pub screen: Option<Point2>,

    /// Viewport size as W,H
    #[arg(long, value_parser = parse_point)]
    pub view: Option<Point2>,

    /// Zoom factor applied before the tap
    #[arg(long, default_value = "1.0")]
    pub zoom: f64,

    /// Pan offset as dx,dy applied before the tap
    #[arg(long, value_parser = parse_point)]
    pub pan: Option<Point2>,
}

pub fn run(args: &MeasureArgs, config: &EngineConfig) -> Result<()> {
    let mut ws = open_workspace(&args.session, config)?;

    let marker = if let Some(p) = args.at {
        ws.add_marker_at(p)
    } else if let Some(p) = args.source {
        ws.add_marker_from_source_point(p)?
    } else if let (Some(screen), Some(view)) = (args.screen, args.view) {
        tap(&mut ws, screen, view, args)?
    } else {
        bail!("one of --at, --source or --screen is required");
    };

    save_workspace(&ws, &args.session)?;
    println!(
        "Marker {} at ({:.4}, {:.4}): row {}, col {}",
        ws.markers().len(),
        marker.normalized_x,
        marker.normalized_y,
        marker.row_index,
        marker.col_index
    );
    Ok(())
}

/// Replay a tap on a viewport of the given size. Only the raster size is
/// needed, so the photo is not decoded and the viewport is driven directly.
fn tap(ws: &mut Workspace, screen: Point2, view: Point2, args: &MeasureArgs) -> Result<Marker> {
    let (width, height) = raster_dimensions(ws.quad(), &ws.config().raster)?;
    ws.set_container(ViewSize::new(view.x, view.y));

    let viewport = ws.viewport_mut();
    viewport.set_raster_size(ViewSize::new(width as f64, height as f64));
    viewport.set_scale(args.zoom);
    if let Some(pan) = args.pan {
        viewport.pan_by(pan.x, pan.y);
    }

    viewport.handle_pointer(PointerEvent::start(screen.x, screen.y));
    match viewport.handle_pointer(PointerEvent::end(screen.x, screen.y)) {
        Some(p) => Ok(ws.add_marker_at(p)),
        None => bail!("tap did not produce a marker"),
    }
}
