use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::consts::SESSION_FORMAT_VERSION;
use crate::error::{KasuriError, Result};
use crate::geometry::homography::UNIT_SQUARE;
use crate::geometry::{CalibrationQuad, Corner, Homography, Point2};
use crate::grid::{GridField, GridSpec, GridSpecInput};
use crate::io::image_io::{DecodeOutput, DecodeTicket};
use crate::markers::{Marker, MarkerSnapshot, MarkerStore};
use crate::raster::{RectifiedRaster, SourceImage};
use crate::rectify::{CacheStatus, RectificationCache};
use crate::session::Session;
use crate::viewport::{InteractionMode, PointerEvent, ViewSize, Viewport};

/// The application-owned measurement session.
///
/// Holds the source photo, calibration quad, grid and markers, and wires them
/// into the rectification cache and viewport. Nothing here is global: the
/// host owns one `Workspace` and calls into it.
#[derive(Debug)]
pub struct Workspace {
    config: EngineConfig,
    image_reference: String,
    source: Option<Arc<SourceImage>>,
    quad: CalibrationQuad,
    grid: GridSpecInput,
    markers: MarkerStore,
    cache: RectificationCache,
    viewport: Viewport,
    decode_generation: u64,
}

impl Workspace {
    pub fn new(config: EngineConfig) -> Self {
        let cache = RectificationCache::with_pivot_epsilon(
            config.raster.clone(),
            config.solver.pivot_epsilon,
        );
        let viewport = Viewport::new(ViewSize::default(), ViewSize::default(), &config.viewport);
        Self {
            grid: GridSpecInput::new(config.grid),
            config,
            image_reference: String::new(),
            source: None,
            quad: CalibrationQuad::default(),
            markers: MarkerStore::new(),
            cache,
            viewport,
            decode_generation: 0,
        }
    }

    /// Rebuild a workspace from a saved session. The photo is attached
    /// separately with [`attach_image`](Self::attach_image).
    pub fn restore(config: EngineConfig, session: Session) -> Result<Self> {
        session.validate()?;
        let mut ws = Self::new(config);
        ws.image_reference = session.image;
        ws.quad = session.quad;
        ws.grid.set(session.grid);
        ws.markers.replace_all(session.markers);
        debug!(markers = ws.markers.len(), "Workspace restored from session");
        Ok(ws)
    }

    /// Snapshot of everything that is persisted.
    pub fn to_session(&self) -> Session {
        Session {
            version: SESSION_FORMAT_VERSION,
            image: self.image_reference.clone(),
            quad: self.quad,
            grid: self.grid.current(),
            markers: self.markers.to_vec(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start over with a new photo: default quad, no markers, view reset.
    pub fn load_image(&mut self, source: SourceImage) {
        info!(
            reference = source.reference(),
            width = source.width(),
            height = source.height(),
            "New source image"
        );
        self.decode_generation += 1;
        self.image_reference = source.reference().to_string();
        self.source = Some(Arc::new(source));
        self.quad = CalibrationQuad::default();
        self.markers.clear();
        self.viewport.reset_view();
        self.viewport.set_raster_size(ViewSize::default());
    }

    /// Start decoding a new photo on a worker thread. Any decode started
    /// earlier is superseded.
    pub fn begin_decode(&mut self, reference: impl Into<String>, bytes: Vec<u8>) -> DecodeTicket {
        self.decode_generation += 1;
        DecodeTicket::spawn(self.decode_generation, reference, bytes)
    }

    /// Apply a finished decode as with [`load_image`](Self::load_image).
    ///
    /// Returns `Ok(false)` and drops the output when a newer decode or load
    /// superseded it. Decode errors are only reported for the latest request.
    pub fn finish_decode(&mut self, output: DecodeOutput) -> Result<bool> {
        if output.generation() != self.decode_generation {
            debug!(
                stale = output.generation(),
                current = self.decode_generation,
                "Discarding superseded image decode"
            );
            return Ok(false);
        }
        self.load_image(output.into_result()?);
        Ok(true)
    }

    /// Attach the decoded photo for a restored session, keeping quad and markers.
    pub fn attach_image(&mut self, source: SourceImage) {
        self.image_reference = source.reference().to_string();
        self.source = Some(Arc::new(source));
    }

    pub fn image_reference(&self) -> &str {
        &self.image_reference
    }

    pub fn source(&self) -> Option<&Arc<SourceImage>> {
        self.source.as_ref()
    }

    pub fn quad(&self) -> &CalibrationQuad {
        &self.quad
    }

    pub fn quad_mut(&mut self) -> &mut CalibrationQuad {
        &mut self.quad
    }

    pub fn set_quad(&mut self, quad: CalibrationQuad) {
        self.quad = quad;
    }

    /// Move the corner nearest to `p` (normalized source coordinates) to `p`.
    pub fn drag_corner(&mut self, p: Point2) -> Corner {
        self.quad.drag_nearest(p)
    }

    pub fn grid(&self) -> GridSpec {
        self.grid.current()
    }

    /// Replace the GridSpec. Existing markers keep their stored cells.
    pub fn set_grid(&mut self, grid: GridSpec) {
        self.grid.set(grid);
    }

    /// Text edit of one grid field. Invalid text keeps the last valid GridSpec.
    pub fn set_grid_text(&mut self, field: GridField, text: &str) -> Result<GridSpec> {
        self.grid.apply_text(field, text)
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn marker_snapshot(&self) -> MarkerSnapshot {
        self.markers.snapshot()
    }

    pub fn remove_marker(&mut self, index: usize) -> Result<Marker> {
        self.markers.remove_at(index)
    }

    pub fn remove_last_marker(&mut self) -> Option<Marker> {
        self.markers.remove_last()
    }

    pub fn replace_markers(&mut self, markers: Vec<Marker>) {
        self.markers.replace_all(markers);
    }

    pub fn cache(&self) -> &RectificationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RectificationCache {
        &mut self.cache
    }

    pub fn raster(&self) -> Option<Arc<RectifiedRaster>> {
        self.cache.raster()
    }

    /// Bring the rectified raster up to date with the current photo and quad.
    ///
    /// On a degenerate quad the previous raster stays published and the error
    /// is returned for display.
    pub fn refresh_raster(&mut self) -> Result<CacheStatus> {
        let source = self.source.as_ref().ok_or(KasuriError::NoSourceImage)?;
        let status = self.cache.update(source, &self.quad)?;
        if let Some(raster) = self.cache.raster() {
            self.viewport.set_raster_size(ViewSize::new(
                raster.width() as f64,
                raster.height() as f64,
            ));
        }
        Ok(status)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_container(&mut self, container: ViewSize) {
        self.viewport.set_container(container);
    }

    /// Feed a pointer event to the measurement view. A finished measure
    /// gesture appends and returns the new marker.
    ///
    /// Measuring needs a raster built from the current photo; until
    /// [`refresh_raster`](Self::refresh_raster) provides one, taps are ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Marker> {
        if self.viewport.mode() == InteractionMode::Measure && !self.raster_is_current() {
            return None;
        }
        let committed = self.viewport.handle_pointer(event)?;
        Some(self.add_marker_at(committed))
    }

    fn raster_is_current(&self) -> bool {
        match (&self.source, self.cache.raster()) {
            (Some(source), Some(raster)) => raster.key().image_id == source.id(),
            _ => false,
        }
    }

    /// Append a marker at a normalized rectified coordinate.
    pub fn add_marker_at(&mut self, p: Point2) -> Marker {
        let marker = Marker::at(p, &self.grid.current());
        self.markers.append(marker);
        debug!(
            row = marker.row_index,
            col = marker.col_index,
            "Marker added"
        );
        marker
    }

    /// Map a point in normalized source-image coordinates through the forward
    /// homography (quad -> unit square) to a marker, without storing it.
    pub fn marker_from_source_point(&self, p: Point2) -> Result<Marker> {
        self.quad.validate()?;
        let forward = Homography::estimate_with_epsilon(
            self.quad.points(),
            &UNIT_SQUARE,
            self.config.solver.pivot_epsilon,
        )?;
        let rectified = forward.try_transform(p).ok_or_else(|| {
            KasuriError::DegenerateGeometry("point maps to infinity under the calibration".into())
        })?;
        Ok(Marker::at(rectified, &self.grid.current()))
    }

    /// Like [`marker_from_source_point`](Self::marker_from_source_point), and
    /// append the result.
    pub fn add_marker_from_source_point(&mut self, p: Point2) -> Result<Marker> {
        let marker = self.marker_from_source_point(p)?;
        self.markers.append(marker);
        Ok(marker)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
