use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

use crate::error::{KasuriError, Result};
use crate::geometry::CalibrationQuad;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// A decoded source photo.
///
/// Every instance gets a process-unique id; the rectification cache keys on
/// it, so re-decoding the same file still counts as a new source image.
#[derive(Clone, Debug)]
pub struct SourceImage {
    id: u64,
    reference: String,
    bitmap: RgbaImage,
}

impl SourceImage {
    pub fn new(reference: impl Into<String>, bitmap: RgbaImage) -> Result<Self> {
        let (width, height) = bitmap.dimensions();
        if width == 0 || height == 0 {
            return Err(KasuriError::InvalidDimensions { width, height });
        }
        Ok(Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            reference: reference.into(),
            bitmap,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Path or URI the image was loaded from, as recorded in sessions.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }
}

/// Identity of the geometry a raster was built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterKey {
    pub image_id: u64,
    pub quad: CalibrationQuad,
}

/// The straightened view of the calibration quad. Immutable once built.
#[derive(Clone, Debug)]
pub struct RectifiedRaster {
    key: RasterKey,
    image: RgbaImage,
}

impl RectifiedRaster {
    pub(crate) fn new(key: RasterKey, image: RgbaImage) -> Self {
        Self { key, image }
    }

    pub fn key(&self) -> &RasterKey {
        &self.key
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGBA at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }
}
