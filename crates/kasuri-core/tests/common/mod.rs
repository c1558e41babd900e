use image::{Rgba, RgbaImage};

use kasuri_core::geometry::{CalibrationQuad, Point2};
use kasuri_core::raster::SourceImage;

/// Solid-color bitmap.
pub fn solid_bitmap(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Bitmap whose red channel encodes the column and green channel the row
/// (both modulo 256), so tests can tell which source pixel was sampled.
pub fn coordinate_bitmap(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

pub fn solid_source(width: u32, height: u32) -> SourceImage {
    SourceImage::new("test://solid.png", solid_bitmap(width, height, [200, 100, 50, 255]))
        .expect("non-empty bitmap")
}

pub fn coordinate_source(width: u32, height: u32) -> SourceImage {
    SourceImage::new("test://coords.png", coordinate_bitmap(width, height))
        .expect("non-empty bitmap")
}

/// Axis-aligned quad from its top-left and bottom-right corners.
pub fn rect_quad(x0: f64, y0: f64, x1: f64, y1: f64) -> CalibrationQuad {
    CalibrationQuad::new([
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ])
    .expect("finite corners")
}

/// A convex but clearly non-rectangular quad, like a photo taken at an angle.
pub fn skewed_quad() -> CalibrationQuad {
    CalibrationQuad::new([
        Point2::new(0.15, 0.1),
        Point2::new(0.9, 0.2),
        Point2::new(0.8, 0.85),
        Point2::new(0.1, 0.75),
    ])
    .expect("finite corners")
}

/// Encode a bitmap as PNG bytes in memory.
pub fn png_bytes(bitmap: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    bitmap
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encode");
    bytes
}
