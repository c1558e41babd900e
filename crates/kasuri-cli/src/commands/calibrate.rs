use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use kasuri_core::config::EngineConfig;
use kasuri_core::geometry::{CalibrationQuad, Corner, Point2};

use super::{open_workspace, parse_floats, parse_point, save_workspace};

#[derive(Args)]
pub struct CalibrateArgs {
    /// Session file
    pub session: PathBuf,

    /// All four corners as x0,y0,x1,y1,x2,y2,x3,y3 (TL, TR, BR, BL; normalized)
    #[arg(long)]
    pub quad: Option<String>,

    /// Move the corner nearest to x,y onto it (repeatable)
    #[arg(long, value_parser = parse_point)]
    pub drag: Vec<Point2>,
}

pub fn run(args: &CalibrateArgs, config: &EngineConfig) -> Result<()> {
    let mut ws = open_workspace(&args.session, config)?;

    if let Some(text) = &args.quad {
        let values = parse_floats(text).map_err(anyhow::Error::msg)?;
        let [x0, y0, x1, y1, x2, y2, x3, y3] = values.as_slice() else {
            bail!("--quad needs exactly 8 numbers, got {}", values.len());
        };
        ws.set_quad(CalibrationQuad::new([
            Point2::new(*x0, *y0),
            Point2::new(*x1, *y1),
            Point2::new(*x2, *y2),
            Point2::new(*x3, *y3),
        ])?);
    }

    for p in &args.drag {
        let corner = ws.drag_corner(*p);
        println!("Moved {corner} corner to ({:.4}, {:.4})", p.x, p.y);
    }

    if let Err(err) = ws.quad().validate() {
        bail!("{err}; session left unchanged");
    }

    save_workspace(&ws, &args.session)?;
    for corner in Corner::ALL {
        let p = ws.quad().corner(corner);
        println!("{:<14}({:.4}, {:.4})", corner.to_string(), p.x, p.y);
    }
    Ok(())
}
