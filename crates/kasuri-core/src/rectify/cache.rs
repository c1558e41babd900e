use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::RasterConfig;
use crate::consts::PIVOT_EPSILON;
use crate::error::{KasuriError, Result};
use crate::geometry::homography::UNIT_SQUARE;
use crate::geometry::{CalibrationQuad, Homography};
use crate::raster::{RasterKey, RectifiedRaster, SourceImage};

use super::{raster_dimensions, rectify};

/// Outcome of [`RectificationCache::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// The published raster already matches the source image and quad.
    Fresh,
    /// A new raster was built and published.
    Rebuilt,
}

/// A self-contained rebuild job, keyed to the cache generation that issued it.
///
/// It owns everything it needs, so it can run on another thread; the result
/// goes back through [`RectificationCache::publish`].
#[derive(Clone, Debug)]
pub struct RebuildRequest {
    generation: u64,
    key: RasterKey,
    source: Arc<SourceImage>,
    inverse: Homography,
    width: u32,
    height: u32,
}

impl RebuildRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> &RasterKey {
        &self.key
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Do the O(W*H) resampling.
    pub fn run(self) -> RebuildOutput {
        let start = Instant::now();
        let image = rectify(&self.source, &self.inverse, self.width, self.height);
        debug!(
            width = self.width,
            height = self.height,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rectification pass finished"
        );
        RebuildOutput {
            generation: self.generation,
            raster: RectifiedRaster::new(self.key, image),
        }
    }
}

/// A finished raster, tagged with the generation of its request.
#[derive(Debug)]
pub struct RebuildOutput {
    generation: u64,
    raster: RectifiedRaster,
}

impl RebuildOutput {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raster(&self) -> &RectifiedRaster {
        &self.raster
    }
}

/// Holds the last valid rectified raster and rebuilds it only when the source
/// image or one of the four corners changes.
///
/// Every change of target geometry bumps the generation; outputs carrying an
/// older generation are dropped on publish. A degenerate quad keeps the
/// previous raster published.
#[derive(Debug)]
pub struct RectificationCache {
    config: RasterConfig,
    pivot_epsilon: f64,
    current: Option<Arc<RectifiedRaster>>,
    target: Option<RasterKey>,
    failed: Option<(RasterKey, String)>,
    generation: u64,
    rebuilds: usize,
}

impl RectificationCache {
    pub fn new(config: RasterConfig) -> Self {
        Self::with_pivot_epsilon(config, PIVOT_EPSILON)
    }

    pub fn with_pivot_epsilon(config: RasterConfig, pivot_epsilon: f64) -> Self {
        Self {
            config,
            pivot_epsilon,
            current: None,
            target: None,
            failed: None,
            generation: 0,
            rebuilds: 0,
        }
    }

    /// Latest published raster, if any.
    pub fn raster(&self) -> Option<Arc<RectifiedRaster>> {
        self.current.clone()
    }

    /// True when the published raster was built from exactly this image and quad.
    pub fn is_valid_for(&self, source: &SourceImage, quad: &CalibrationQuad) -> bool {
        self.current
            .as_ref()
            .is_some_and(|r| r.key() == &key_for(source, quad))
    }

    /// Number of rasters published so far.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the published raster and any in-flight work, e.g. on session reset.
    pub fn clear(&mut self) {
        self.current = None;
        self.target = None;
        self.failed = None;
        self.generation += 1;
    }

    /// Plan a rebuild for `source` + `quad`.
    ///
    /// Returns `Ok(None)` when nothing needs building (already published or
    /// already in flight). A degenerate quad returns `DegenerateGeometry` and
    /// leaves the published raster untouched.
    pub fn request(
        &mut self,
        source: &Arc<SourceImage>,
        quad: &CalibrationQuad,
    ) -> Result<Option<RebuildRequest>> {
        let key = key_for(source, quad);

        if self.target == Some(key) {
            return Ok(None);
        }
        if let Some((failed_key, reason)) = &self.failed {
            if *failed_key == key {
                return Err(KasuriError::DegenerateGeometry(reason.clone()));
            }
        }

        // The target geometry moved: whatever is still in flight is stale.
        self.generation += 1;
        self.target = None;
        self.failed = None;

        if self.current.as_ref().is_some_and(|r| r.key() == &key) {
            self.target = Some(key);
            return Ok(None);
        }

        let plan = quad.validate().and_then(|_| {
            let inverse =
                Homography::estimate_with_epsilon(&UNIT_SQUARE, quad.points(), self.pivot_epsilon)?;
            let (width, height) = raster_dimensions(quad, &self.config)?;
            Ok((inverse, width, height))
        });

        let (inverse, width, height) = match plan {
            Ok(plan) => plan,
            Err(err) => {
                let reason = match &err {
                    KasuriError::DegenerateGeometry(reason) => reason.clone(),
                    other => other.to_string(),
                };
                warn!(%reason, "Calibration quad is degenerate; keeping previous raster");
                self.failed = Some((key, reason.clone()));
                return Err(KasuriError::DegenerateGeometry(reason));
            }
        };

        self.target = Some(key);
        Ok(Some(RebuildRequest {
            generation: self.generation,
            key,
            source: Arc::clone(source),
            inverse,
            width,
            height,
        }))
    }

    /// Forget the in-flight request of `generation` when its output will never
    /// arrive (worker failed or the host cancelled it), so the same geometry
    /// can be requested again. Older generations are ignored.
    pub fn abandon(&mut self, generation: u64) {
        if generation == self.generation && !self.target_is_published() {
            debug!(generation, "Rectification request abandoned");
            self.target = None;
        }
    }

    fn target_is_published(&self) -> bool {
        match (&self.current, &self.target) {
            (Some(raster), Some(target)) => raster.key() == target,
            _ => false,
        }
    }

    /// Publish a finished rebuild. Returns `false` (and discards the raster)
    /// if a newer request superseded it.
    pub fn publish(&mut self, output: RebuildOutput) -> bool {
        if output.generation != self.generation {
            debug!(
                stale = output.generation,
                current = self.generation,
                "Discarding stale rectification result"
            );
            return false;
        }
        info!(
            width = output.raster.width(),
            height = output.raster.height(),
            "Rectified raster rebuilt"
        );
        self.current = Some(Arc::new(output.raster));
        self.rebuilds += 1;
        true
    }

    /// Synchronous request + run + publish. An unfinished asynchronous request
    /// for the same geometry is superseded rather than waited on.
    pub fn update(
        &mut self,
        source: &Arc<SourceImage>,
        quad: &CalibrationQuad,
    ) -> Result<CacheStatus> {
        if self.target == Some(key_for(source, quad)) && !self.target_is_published() {
            self.target = None;
        }
        match self.request(source, quad)? {
            None => Ok(CacheStatus::Fresh),
            Some(request) => {
                self.publish(request.run());
                Ok(CacheStatus::Rebuilt)
            }
        }
    }
}

impl Default for RectificationCache {
    fn default() -> Self {
        Self::new(RasterConfig::default())
    }
}

fn key_for(source: &SourceImage, quad: &CalibrationQuad) -> RasterKey {
    RasterKey {
        image_id: source.id(),
        quad: *quad,
    }
}
