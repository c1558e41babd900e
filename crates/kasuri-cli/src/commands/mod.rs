pub mod calibrate;
pub mod config;
pub mod info;
pub mod init;
pub mod markers;
pub mod measure;
pub mod rectify;

use std::path::Path;

use anyhow::{Context, Result};
use kasuri_core::config::EngineConfig;
use kasuri_core::geometry::Point2;
use kasuri_core::io::image_io::load_image;
use kasuri_core::io::session_file::{load_session, save_session};
use kasuri_core::workspace::Workspace;
use tracing::debug;

/// Read the `--config` file, or fall back to defaults.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = EngineConfig::from_toml(&contents).context("Invalid engine config")?;
    debug!(path = %path.display(), "Loaded engine config");
    Ok(config)
}

/// Restore a workspace from a session file. The photo is not decoded.
pub fn open_workspace(session: &Path, config: &EngineConfig) -> Result<Workspace> {
    let saved = load_session(session)
        .with_context(|| format!("Failed to load session {}", session.display()))?;
    Ok(Workspace::restore(config.clone(), saved)?)
}

/// Decode the photo a restored workspace refers to.
pub fn attach_photo(ws: &mut Workspace) -> Result<()> {
    let path = ws.image_reference().to_string();
    let source = load_image(Path::new(&path))
        .with_context(|| format!("Failed to load image {path}"))?;
    ws.attach_image(source);
    Ok(())
}

pub fn save_workspace(ws: &Workspace, session: &Path) -> Result<()> {
    save_session(&ws.to_session(), session)
        .with_context(|| format!("Failed to write session {}", session.display()))
}

/// Parse `x,y` into a point.
pub fn parse_point(s: &str) -> std::result::Result<Point2, String> {
    let values = parse_floats(s)?;
    match values.as_slice() {
        [x, y] => Ok(Point2::new(*x, *y)),
        _ => Err(format!("expected x,y but got {s:?}")),
    }
}

/// Parse a comma-separated list of finite numbers.
pub fn parse_floats(s: &str) -> std::result::Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(format!("{part:?} is not a finite number")),
            }
        })
        .collect()
}
