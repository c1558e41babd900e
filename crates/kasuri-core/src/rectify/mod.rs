mod cache;

pub use cache::{CacheStatus, RebuildOutput, RebuildRequest, RectificationCache};

use image::RgbaImage;
use rayon::prelude::*;

use crate::config::RasterConfig;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{KasuriError, Result};
use crate::geometry::{CalibrationQuad, Homography, Point2};
use crate::raster::SourceImage;

/// Size of the rectified raster: fixed width, height from the quad's aspect
/// ratio (`round(width / ratio)`), capped at `config.max_height`.
pub fn raster_dimensions(quad: &CalibrationQuad, config: &RasterConfig) -> Result<(u32, u32)> {
    let width = config.target_width.max(1);
    let ratio = quad.aspect_ratio().ok_or_else(|| {
        KasuriError::DegenerateGeometry("calibration quad has zero-length edges".into())
    })?;
    let height = (width as f64 / ratio).round();
    let height = if height.is_finite() {
        height.clamp(1.0, config.max_height.max(1) as f64) as u32
    } else {
        1
    };
    Ok((width, height))
}

/// Resample `source` into a `width` x `height` raster by inverse mapping with
/// nearest-neighbor sampling.
///
/// `inverse` maps the unit square onto the calibration quad in normalized
/// source coordinates. Destination pixels whose source falls outside the
/// image (or maps to infinity) stay transparent black.
pub fn rectify(source: &SourceImage, inverse: &Homography, width: u32, height: u32) -> RgbaImage {
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 {
        return RgbaImage::new(width, height);
    }

    let row_bytes = w * 4;
    let mut buf = vec![0u8; row_bytes * h];

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        buf.par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| fill_row(source, inverse, y, w, h, row));
    } else {
        buf.chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| fill_row(source, inverse, y, w, h, row));
    }

    RgbaImage::from_raw(width, height, buf).unwrap_or_else(|| RgbaImage::new(width, height))
}

fn fill_row(
    source: &SourceImage,
    inverse: &Homography,
    y: usize,
    w: usize,
    h: usize,
    row: &mut [u8],
) {
    let src = source.bitmap();
    let (sw, sh) = src.dimensions();
    let raw = src.as_raw();
    let ny = y as f64 / h as f64;

    for (x, px) in row.chunks_exact_mut(4).enumerate() {
        let p = inverse.transform(Point2::new(x as f64 / w as f64, ny));
        let Some((sx, sy)) = source_pixel(p, sw, sh) else {
            continue;
        };
        let idx = (sy as usize * sw as usize + sx as usize) * 4;
        px[..3].copy_from_slice(&raw[idx..idx + 3]);
        px[3] = 255;
    }
}

/// Floor a normalized source coordinate to a pixel, or `None` if it falls
/// outside the image.
fn source_pixel(p: Point2, sw: u32, sh: u32) -> Option<(u32, u32)> {
    if !p.is_finite() {
        return None;
    }
    let sx = (p.x * sw as f64).floor();
    let sy = (p.y * sh as f64).floor();
    if sx < 0.0 || sy < 0.0 || sx >= sw as f64 || sy >= sh as f64 {
        return None;
    }
    Some((sx as u32, sy as u32))
}
